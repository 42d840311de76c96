//! # Slash Commands (/)
//!
//! Command definitions and registration.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add /schedule
//! - 1.0.0: Initial implementation

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

/// Creates all slash command definitions.
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_next_command(),
        create_schedule_command(),
        create_ping_command(),
    ]
}

fn create_next_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("next")
        .description("Show the next reminder and how long until it fires");
    command
}

fn create_schedule_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("schedule")
        .description("List the full daily reminder schedule");
    command
}

fn create_ping_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("ping")
        .description("Check that the bot is responsive");
    command
}

/// Registers all slash commands globally (production mode; propagation can
/// take up to an hour).
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

/// Registers all slash commands for a specific guild (instant update, for
/// development).
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild slash commands registered for guild {guild_id} ({count} commands)");
    Ok(())
}
