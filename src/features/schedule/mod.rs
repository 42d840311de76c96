//! # Schedule Feature
//!
//! Daily reminder scheduling: the trigger table, the tick-driven
//! scheduler with its catch-up/dedup policy, and Discord delivery.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod delivery;
pub mod scheduler;
pub mod triggers;

pub use delivery::ChannelNotifier;
pub use scheduler::{
    FiredEvent, Notifier, NotifyError, ReminderScheduler, GRACE_WINDOW_MINUTES,
    TICK_INTERVAL_SECS,
};
pub use triggers::{ConfigError, NextDue, ScheduleConfig, Trigger, TriggerTable};
