//! # Startup Notification Feature
//!
//! One-shot notification when the bot comes online.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true

pub mod notification;

pub use notification::StartupNotifier;
