//! # Feature: Startup Notification
//!
//! Sends an "online" message to the reminder channel when the gateway
//! session first becomes ready. Reconnects stay quiet so a flaky network
//! does not spam the channel.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: First-ready guard moved from a static to an instance field
//! - 1.0.0: Initial implementation

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use serenity::http::Http;
use serenity::model::id::ChannelId;

/// Sends the one-shot startup message.
pub struct StartupNotifier {
    channel_id: ChannelId,
    /// Tracks whether this is the first Ready event (vs reconnect).
    announced: AtomicBool,
}

impl StartupNotifier {
    pub fn new(channel_id: u64) -> Self {
        StartupNotifier {
            channel_id: ChannelId(channel_id),
            announced: AtomicBool::new(false),
        }
    }

    /// Sends the online message on the first ready only.
    ///
    /// Failure is logged and dropped; an unreachable channel at startup
    /// must not take the scheduler down with it.
    pub async fn announce(&self, http: &Http, trigger_count: usize) {
        if self.announced.swap(true, Ordering::SeqCst) {
            info!("Skipping startup message (reconnect, not initial startup)");
            return;
        }

        let text = online_message(trigger_count);
        match self.channel_id.say(http, &text).await {
            Ok(_) => info!("Sent startup message to channel {}", self.channel_id),
            Err(e) => warn!(
                "Failed to send startup message to channel {}: {e}",
                self.channel_id
            ),
        }
    }
}

fn online_message(trigger_count: usize) -> String {
    format!(
        "✅ Bot is online! Med reminder schedule loaded ({} reminder{}). 💊",
        trigger_count,
        if trigger_count == 1 { "" } else { "s" }
    )
}
