//! # Reminder Delivery
//!
//! Discord-backed notifier: resolves the reminder channel and posts the
//! rendered message, optionally pinging the configured user.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Bound each send attempt with a timeout
//! - 1.0.0: Initial implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tokio::time::timeout;

use super::scheduler::{Notifier, NotifyError};

/// Per-attempt bound on a Discord send. A hung request must not stall
/// subsequent scheduler ticks.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers reminders to a fixed Discord channel.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channel_id: ChannelId,
    mention_user_id: Option<u64>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: u64, mention_user_id: Option<u64>) -> Self {
        ChannelNotifier {
            http,
            channel_id: ChannelId(channel_id),
            mention_user_id,
        }
    }

    /// Prefix the configured user mention, if any.
    fn decorate(&self, text: &str) -> String {
        match self.mention_user_id {
            Some(user_id) => format!("<@{user_id}> {text}"),
            None => text.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        // Resolve the channel first: a deleted or inaccessible channel is
        // a lookup failure, not a delivery failure.
        let channel = timeout(SEND_TIMEOUT, self.http.get_channel(self.channel_id.0))
            .await
            .map_err(|_| NotifyError::Timeout(SEND_TIMEOUT))?
            .map_err(|e| NotifyError::Lookup(format!("channel {}: {e}", self.channel_id)))?;

        let message = self.decorate(text);
        timeout(SEND_TIMEOUT, channel.id().say(&self.http, &message))
            .await
            .map_err(|_| NotifyError::Timeout(SEND_TIMEOUT))?
            .map_err(|e| NotifyError::Delivery(format!("channel {}: {e}", self.channel_id)))?;

        debug!("Delivered reminder to channel {}", self.channel_id);
        Ok(())
    }
}
