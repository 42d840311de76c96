//! # Features Layer
//!
//! All feature modules. Each module documents its own version in its
//! header; the registry below is what `/ping` and the startup logs report.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod health;
pub mod schedule;
pub mod startup;

pub use health::HealthState;
pub use schedule::{
    ChannelNotifier, FiredEvent, Notifier, ReminderScheduler, ScheduleConfig, TriggerTable,
};
pub use startup::StartupNotifier;

/// Name and version of one feature module.
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Crate version from Cargo.toml.
pub fn get_bot_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// All feature modules with their versions.
pub fn get_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: "Schedule",
            version: "1.2.0",
        },
        FeatureInfo {
            name: "Startup",
            version: "1.1.0",
        },
        FeatureInfo {
            name: "Health",
            version: "1.0.0",
        },
    ]
}
