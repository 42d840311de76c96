//! # Trigger Table
//!
//! The fixed daily reminder schedule: an ordered, immutable set of triggers
//! loaded once at startup from YAML, with the original hardcoded medication
//! schedule as the built-in fallback.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Move the next-occurrence query here (shared read path over the table)
//! - 1.1.0: YAML schedule file with built-in fallback
//! - 1.0.0: Initial implementation with hardcoded schedule

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that make a schedule unusable.
///
/// All of these are fatal at startup: the process must not run with an
/// invalid schedule.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate trigger id '{0}'")]
    DuplicateId(String),
    #[error("trigger '{id}' has out-of-range time {hour:02}:{minute:02}")]
    TimeOutOfRange { id: String, hour: u32, minute: u32 },
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// A single daily reminder definition. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Stable identity key, unique across the table. Never reused.
    pub id: String,
    /// Human-readable time label, display only ("7:00 AM").
    pub label: String,
    /// Local wall-clock time of day in the schedule's timezone.
    pub time_of_day: NaiveTime,
    /// Reminder body ("Mucopro time! 💊").
    pub message: String,
}

impl Trigger {
    /// The instant this trigger is scheduled for on `date` in `tz`.
    ///
    /// Returns None for local times that do not exist on that date (DST
    /// gap); such a date simply has no occurrence of the trigger.
    pub fn scheduled_on(&self, date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
        tz.from_local_datetime(&date.and_time(self.time_of_day))
            .earliest()
    }

    /// The deliverable text for this trigger.
    pub fn render(&self) -> String {
        format!("⏰ {} {}", self.label, self.message)
    }
}

/// One trigger as written in the schedule file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerDef {
    pub id: String,
    pub label: String,
    pub hour: u32,
    pub minute: u32,
    pub message: String,
}

/// On-disk schedule definition (`triggers.yaml`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// IANA timezone name all trigger times are interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub triggers: Vec<TriggerDef>,
}

fn default_timezone() -> String {
    "Asia/Singapore".to_string()
}

impl ScheduleConfig {
    /// Load a schedule from a YAML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ScheduleConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// The built-in medication schedule used when no file is configured.
    pub fn builtin() -> Self {
        let def = |id: &str, label: &str, hour: u32, minute: u32, message: &str| TriggerDef {
            id: id.to_string(),
            label: label.to_string(),
            hour,
            minute,
            message: message.to_string(),
        };

        ScheduleConfig {
            timezone: default_timezone(),
            triggers: vec![
                def("mucopro-0700", "7:00 AM", 7, 0, "Mucopro time! 💊"),
                def("mucopro-1230", "12:30 PM", 12, 30, "Mucopro time! 💊"),
                def("pantec-1800", "6:00 PM", 18, 0, "Pantec-DSR time! 💊"),
                def("mucopro-1900", "7:00 PM", 19, 0, "Mucopro time! 💊"),
                def("zycast-2100", "9:00 PM", 21, 0, "Zycast time! 💊"),
            ],
        }
    }
}

/// Result of the next-occurrence query.
#[derive(Debug, Clone)]
pub struct NextDue<'a> {
    pub trigger: &'a Trigger,
    pub scheduled_at: DateTime<Tz>,
    pub remaining: Duration,
}

/// The ordered, immutable trigger table plus its timezone.
///
/// Construction validates the whole schedule; after that the table never
/// mutates and every call to [`TriggerTable::all`] sees the same list.
#[derive(Debug, Clone)]
pub struct TriggerTable {
    tz: Tz,
    triggers: Vec<Trigger>,
}

impl TriggerTable {
    /// Build and validate a table from a schedule definition.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(config.timezone.clone()))?;

        let mut seen = HashSet::new();
        let mut triggers = Vec::with_capacity(config.triggers.len());
        for def in &config.triggers {
            if !seen.insert(def.id.as_str()) {
                return Err(ConfigError::DuplicateId(def.id.clone()));
            }
            let time_of_day = NaiveTime::from_hms_opt(def.hour, def.minute, 0).ok_or(
                ConfigError::TimeOutOfRange {
                    id: def.id.clone(),
                    hour: def.hour,
                    minute: def.minute,
                },
            )?;
            triggers.push(Trigger {
                id: def.id.clone(),
                label: def.label.clone(),
                time_of_day,
                message: def.message.clone(),
            });
        }

        Ok(TriggerTable { tz, triggers })
    }

    /// The timezone all trigger times are interpreted in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// All triggers in table order.
    pub fn all(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// The next future occurrence across the whole table.
    ///
    /// Today's instant if still ahead of `now`, otherwise tomorrow's; the
    /// trigger with the least time remaining wins and table order breaks
    /// ties. Fired state and the grace window play no part here - this is
    /// a forward-looking display query.
    ///
    /// Returns None only for an empty table.
    pub fn next_due(&self, now: DateTime<Tz>) -> Option<NextDue<'_>> {
        let today = now.date_naive();
        let mut best: Option<NextDue<'_>> = None;

        for trigger in &self.triggers {
            let upcoming = trigger
                .scheduled_on(today, self.tz)
                .filter(|at| *at > now)
                .or_else(|| trigger.scheduled_on(today.succ_opt()?, self.tz));
            let Some(scheduled_at) = upcoming else {
                continue;
            };
            let remaining = scheduled_at - now;

            // Strict comparison keeps the first trigger in table order on ties.
            let better = match &best {
                Some(b) => remaining < b.remaining,
                None => true,
            };
            if better {
                best = Some(NextDue {
                    trigger,
                    scheduled_at,
                    remaining,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Singapore;

    fn def(id: &str, hour: u32, minute: u32) -> TriggerDef {
        TriggerDef {
            id: id.to_string(),
            label: format!("{hour}:{minute:02}"),
            hour,
            minute,
            message: format!("{id} time!"),
        }
    }

    fn table(defs: Vec<TriggerDef>) -> TriggerTable {
        TriggerTable::from_config(&ScheduleConfig {
            timezone: "Asia/Singapore".to_string(),
            triggers: defs,
        })
        .unwrap()
    }

    fn sgt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Singapore.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_builtin_schedule_is_valid() {
        let table = TriggerTable::from_config(&ScheduleConfig::builtin()).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.timezone(), Singapore);
        assert_eq!(table.all()[0].id, "mucopro-0700");
        assert_eq!(table.all()[4].id, "zycast-2100");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let config = ScheduleConfig {
            timezone: "Asia/Singapore".to_string(),
            triggers: vec![def("a", 7, 0), def("a", 8, 0)],
        };
        let err = TriggerTable::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_out_of_range_time_rejected() {
        let config = ScheduleConfig {
            timezone: "Asia/Singapore".to_string(),
            triggers: vec![def("late", 24, 0)],
        };
        assert!(matches!(
            TriggerTable::from_config(&config).unwrap_err(),
            ConfigError::TimeOutOfRange { hour: 24, .. }
        ));

        let config = ScheduleConfig {
            timezone: "Asia/Singapore".to_string(),
            triggers: vec![def("odd", 7, 60)],
        };
        assert!(matches!(
            TriggerTable::from_config(&config).unwrap_err(),
            ConfigError::TimeOutOfRange { minute: 60, .. }
        ));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = ScheduleConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            triggers: vec![def("a", 7, 0)],
        };
        assert!(matches!(
            TriggerTable::from_config(&config).unwrap_err(),
            ConfigError::UnknownTimezone(_)
        ));
    }

    #[test]
    fn test_yaml_schedule_parses() {
        let yaml = r#"
timezone: Asia/Singapore
triggers:
  - id: mucopro-0700
    label: "7:00 AM"
    hour: 7
    minute: 0
    message: "Mucopro time!"
"#;
        let config: ScheduleConfig = serde_yaml::from_str(yaml).unwrap();
        let table = TriggerTable::from_config(&config).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.all()[0].time_of_day,
            NaiveTime::from_hms_opt(7, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_render_includes_label_and_message() {
        let table = table(vec![def("a", 7, 0)]);
        let text = table.all()[0].render();
        assert!(text.contains("7:00"));
        assert!(text.contains("a time!"));
    }

    #[test]
    fn test_next_due_one_minute_before_trigger() {
        let table = table(vec![def("a", 7, 0), def("b", 18, 0)]);
        let next = table.next_due(sgt(2025, 6, 10, 6, 59)).unwrap();
        assert_eq!(next.trigger.id, "a");
        assert_eq!(next.remaining, Duration::minutes(1));
        assert_eq!(next.scheduled_at, sgt(2025, 6, 10, 7, 0));
    }

    #[test]
    fn test_next_due_rolls_to_tomorrow_at_last_trigger_instant() {
        let table = table(vec![def("a", 7, 0), def("b", 18, 0)]);
        // Exactly at the last trigger's instant it counts as past, so the
        // first trigger tomorrow is next.
        let next = table.next_due(sgt(2025, 6, 10, 18, 0)).unwrap();
        assert_eq!(next.trigger.id, "a");
        assert_eq!(next.scheduled_at, sgt(2025, 6, 11, 7, 0));
        assert_eq!(next.remaining, Duration::hours(13));
    }

    #[test]
    fn test_next_due_between_triggers() {
        let table = table(vec![def("a", 7, 0), def("b", 18, 0)]);
        let next = table.next_due(sgt(2025, 6, 10, 12, 0)).unwrap();
        assert_eq!(next.trigger.id, "b");
        assert_eq!(next.remaining, Duration::hours(6));
    }

    #[test]
    fn test_next_due_tie_breaks_by_table_order() {
        let table = table(vec![def("first", 9, 0), def("second", 9, 0)]);
        let next = table.next_due(sgt(2025, 6, 10, 8, 0)).unwrap();
        assert_eq!(next.trigger.id, "first");
    }

    #[test]
    fn test_next_due_empty_table() {
        let table = table(vec![]);
        assert!(table.next_due(sgt(2025, 6, 10, 8, 0)).is_none());
    }
}
