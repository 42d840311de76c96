//! Slash command dispatch
//!
//! Handles: next, schedule, ping
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Add /schedule listing
//! - 1.0.0: Initial implementation

use anyhow::Result;
use chrono::{Duration, Utc};
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use super::context::CommandContext;

/// Dispatches slash commands to their handlers.
pub struct CommandHandler {
    ctx: Arc<CommandContext>,
}

impl CommandHandler {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        CommandHandler { ctx }
    }

    /// Handle one slash command interaction.
    pub async fn handle_slash_command(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "next" => self.handle_next(serenity_ctx, command).await,
            "schedule" => self.handle_schedule(serenity_ctx, command).await,
            "ping" => self.handle_ping(serenity_ctx, command).await,
            _ => Ok(()),
        }
    }

    /// Handle /next - time until the next reminder.
    ///
    /// Forward-looking only: whether today's occurrence already fired or
    /// missed its grace window does not change the answer.
    async fn handle_next(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let now = Utc::now().with_timezone(&self.ctx.table.timezone());

        let content = match self.ctx.table.next_due(now) {
            Some(next) => format!(
                "⏰ Next reminder: **{}** — {} (in {})",
                next.trigger.label,
                next.trigger.message,
                format_remaining(next.remaining)
            ),
            None => "❌ No reminders configured.".to_string(),
        };

        respond(serenity_ctx, command, &content).await?;
        info!("Next command completed for user {}", command.user.id);
        Ok(())
    }

    /// Handle /schedule - list the full daily schedule.
    async fn handle_schedule(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let content = if self.ctx.table.is_empty() {
            "❌ No reminders configured.".to_string()
        } else {
            let mut out = format!(
                "📋 **Daily reminder schedule** ({}):\n",
                self.ctx.table.timezone()
            );
            for trigger in self.ctx.table.all() {
                out.push_str(&format!("• **{}** — {}\n", trigger.label, trigger.message));
            }
            out
        };

        respond(serenity_ctx, command, &content).await?;
        info!("Schedule command completed for user {}", command.user.id);
        Ok(())
    }

    /// Handle /ping.
    async fn handle_ping(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let uptime = self.ctx.start_time.elapsed();
        let content = format!(
            "Pong! v{} — up {}h {}m",
            crate::features::get_bot_version(),
            uptime.as_secs() / 3600,
            (uptime.as_secs() % 3600) / 60
        );

        respond(serenity_ctx, command, &content).await?;
        info!("Ping command completed for user {}", command.user.id);
        Ok(())
    }
}

async fn respond(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content))
        })
        .await?;
    Ok(())
}

/// Format a remaining duration as hours and minutes.
fn format_remaining(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes();
    if total_minutes < 1 {
        return "less than a minute".to_string();
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
