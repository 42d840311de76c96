//! # Configuration
//!
//! Environment-driven process configuration. The schedule itself (trigger
//! times, messages, timezone) lives in the YAML file named by
//! `TRIGGERS_CONFIG_PATH`, not here.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;

/// Process configuration read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,
    /// Channel reminders are delivered to.
    pub reminder_channel_id: u64,
    /// User to ping in each reminder, if any.
    pub mention_user_id: Option<u64>,
    /// Guild for instant command registration in development mode.
    pub discord_guild_id: Option<String>,
    /// Path to the schedule YAML file.
    pub triggers_path: String,
    /// Bind address for the liveness endpoint.
    pub health_bind_addr: String,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_BOT_TOKEN").map_err(|_| {
            anyhow::anyhow!(
                "DISCORD_BOT_TOKEN environment variable not set. \
                 Set it to your bot token before running."
            )
        })?;

        let reminder_channel_id = std::env::var("REMINDER_CHANNEL_ID")
            .map_err(|_| anyhow::anyhow!("REMINDER_CHANNEL_ID environment variable not set"))?
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("REMINDER_CHANNEL_ID must be a numeric channel id"))?;

        let mention_user_id = match std::env::var("REMINDER_MENTION_USER_ID") {
            Ok(v) if !v.trim().is_empty() => Some(v.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("REMINDER_MENTION_USER_ID must be a numeric user id")
            })?),
            _ => None,
        };

        Ok(Config {
            discord_token,
            reminder_channel_id,
            mention_user_id,
            discord_guild_id: std::env::var("DISCORD_GUILD_ID").ok(),
            triggers_path: env_or("TRIGGERS_CONFIG_PATH", "triggers.yaml"),
            health_bind_addr: env_or("HEALTH_BIND_ADDR", "0.0.0.0:8080"),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
