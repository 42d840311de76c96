//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add /schedule listing
//! - 1.0.0: Initial implementation with /next and /ping

pub mod context;
pub mod handler;
pub mod slash;

pub use context::CommandContext;
pub use handler::CommandHandler;
pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};
