//! # Reminder Scheduler
//!
//! The tick-driven scheduling loop. Once a minute it compares wall-clock
//! time against every trigger and decides which are due, which already
//! fired today, and which missed their window. Every decision is derived
//! fresh from the clock, so gaps in execution (suspension, missed wake-ups,
//! clock adjustments) self-heal on the next tick as long as they stay
//! inside the grace window.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Replace one timer task per reminder with the single data-driven tick loop
//! - 1.1.0: Grace window for late fires after downtime
//! - 1.0.0: Initial implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use thiserror::Error;

use super::triggers::TriggerTable;

/// Maximum lateness, in minutes, after which an unfired trigger is skipped
/// for the rest of the day.
pub const GRACE_WINDOW_MINUTES: i64 = 120;

/// Seconds between evaluation passes.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Delivery failures surfaced by a [`Notifier`].
///
/// Lookup and delivery failures share one recovery policy: the scheduler
/// logs them, leaves the trigger unfired, and retries on the next tick
/// until the grace window expires.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The message sink could not be resolved.
    #[error("sink lookup failed: {0}")]
    Lookup(String),
    /// The sink was reachable but the send failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
    /// The send did not complete within the per-attempt bound.
    #[error("delivery timed out after {0:?}")]
    Timeout(StdDuration),
}

/// A capability that delivers one rendered reminder to the end recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Record of one successful notification emitted by a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredEvent {
    pub trigger_id: String,
    pub date: NaiveDate,
}

/// Owns the per-trigger fire bookkeeping and evaluates the schedule.
///
/// One instance is constructed at startup and driven by [`run`]; nothing
/// else reads or writes the fire map. The map holds the calendar date each
/// trigger last fired on - absent means never fired since process start,
/// and the whole map is intentionally lost on restart.
///
/// [`run`]: ReminderScheduler::run
pub struct ReminderScheduler {
    table: Arc<TriggerTable>,
    last_fired: HashMap<String, NaiveDate>,
}

impl ReminderScheduler {
    pub fn new(table: Arc<TriggerTable>) -> Self {
        ReminderScheduler {
            table,
            last_fired: HashMap::new(),
        }
    }

    /// One evaluation pass over the whole table at `now`.
    ///
    /// For each trigger: skip if not yet due today, skip (permanently for
    /// today) if more than [`GRACE_WINDOW_MINUTES`] late, skip if already
    /// fired today. Otherwise deliver; the fire date is recorded only on a
    /// successful send, so a failed delivery is retried on the next tick
    /// for as long as the grace window lasts.
    ///
    /// A failure for one trigger never aborts evaluation of the rest.
    pub async fn tick<N: Notifier + ?Sized>(
        &mut self,
        now: DateTime<Tz>,
        notifier: &N,
    ) -> Vec<FiredEvent> {
        let today = now.date_naive();
        let mut fired = Vec::new();

        for trigger in self.table.all() {
            let Some(scheduled) = trigger.scheduled_on(today, self.table.timezone()) else {
                continue;
            };
            if now < scheduled {
                continue;
            }

            let lateness = now - scheduled;
            if lateness > Duration::minutes(GRACE_WINDOW_MINUTES) {
                debug!(
                    "Trigger '{}' missed its window today ({} minutes late), skipping",
                    trigger.id,
                    lateness.num_minutes()
                );
                continue;
            }

            if self.last_fired.get(&trigger.id) == Some(&today) {
                continue;
            }

            match notifier.send(&trigger.render()).await {
                Ok(()) => {
                    self.last_fired.insert(trigger.id.clone(), today);
                    info!(
                        "Sent reminder '{}' ({} minutes after schedule)",
                        trigger.id,
                        lateness.num_minutes()
                    );
                    fired.push(FiredEvent {
                        trigger_id: trigger.id.clone(),
                        date: today,
                    });
                }
                Err(e) => {
                    warn!(
                        "Reminder '{}' not delivered, will retry next tick: {e}",
                        trigger.id
                    );
                }
            }
        }

        fired
    }

    /// Drive [`tick`] once per minute forever.
    ///
    /// Ticks are serialized by construction: the next evaluation starts
    /// only after every notify attempt of the previous one has finished.
    ///
    /// [`tick`]: ReminderScheduler::tick
    pub async fn run<N: Notifier>(mut self, notifier: N) {
        let tz = self.table.timezone();
        let mut interval = tokio::time::interval(StdDuration::from_secs(TICK_INTERVAL_SECS));

        info!(
            "Reminder scheduler running: {} triggers, timezone {}, {} minute grace window",
            self.table.len(),
            tz,
            GRACE_WINDOW_MINUTES
        );

        loop {
            interval.tick().await;
            let now = Utc::now().with_timezone(&tz);
            self.tick(now, &notifier).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schedule::triggers::{ScheduleConfig, TriggerDef};
    use chrono::TimeZone;
    use chrono_tz::Asia::Singapore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Notifier that records every sent message and can be told to fail
    /// its next N sends.
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        failures_remaining: AtomicUsize,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            RecordingNotifier {
                sent: Mutex::new(Vec::new()),
                failures_remaining: AtomicUsize::new(0),
            }
        }

        fn failing(count: usize) -> Self {
            let notifier = Self::new();
            notifier.failures_remaining.store(count, Ordering::SeqCst);
            notifier
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(NotifyError::Delivery("unit test outage".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn def(id: &str, hour: u32, minute: u32) -> TriggerDef {
        TriggerDef {
            id: id.to_string(),
            label: format!("{hour}:{minute:02}"),
            hour,
            minute,
            message: format!("{id} time!"),
        }
    }

    fn scheduler(defs: Vec<TriggerDef>) -> ReminderScheduler {
        let table = TriggerTable::from_config(&ScheduleConfig {
            timezone: "Asia/Singapore".to_string(),
            triggers: defs,
        })
        .unwrap();
        ReminderScheduler::new(Arc::new(table))
    }

    fn sgt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Singapore.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[tokio::test]
    async fn test_fires_within_grace_with_configured_payload() {
        let mut sched = scheduler(vec![def("a", 7, 0), def("b", 18, 0)]);
        let notifier = RecordingNotifier::new();

        let fired = sched.tick(sgt(2025, 6, 10, 7, 3), &notifier).await;

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "a");
        assert_eq!(fired[0].date, sgt(2025, 6, 10, 7, 3).date_naive());
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("a time!"));
    }

    #[tokio::test]
    async fn test_not_yet_due_fires_nothing() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        let fired = sched.tick(sgt(2025, 6, 10, 6, 59), &notifier).await;

        assert!(fired.is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_grace_expired_never_fires_that_day() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        // First tick of the day lands one minute past the grace window.
        let fired = sched.tick(sgt(2025, 6, 10, 9, 1), &notifier).await;
        assert!(fired.is_empty());

        // Still nothing on later ticks; the window stays expired.
        let fired = sched.tick(sgt(2025, 6, 10, 9, 2), &notifier).await;
        assert!(fired.is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_exactly_at_grace_boundary_still_fires() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        let fired = sched.tick(sgt(2025, 6, 10, 9, 0), &notifier).await;
        assert_eq!(fired.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_tick_same_instant_is_idempotent() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        let now = sgt(2025, 6, 10, 7, 2);
        let first = sched.tick(now, &notifier).await;
        let second = sched.tick(now, &notifier).await;

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_at_most_once_per_day_across_many_ticks() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        // Tick every minute from 07:00 through 09:00.
        for minute_offset in 0..=120 {
            let now = sgt(2025, 6, 10, 7, 0) + Duration::minutes(minute_offset);
            sched.tick(now, &notifier).await;
        }

        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_retries_next_tick() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::failing(1);

        // Sink is down on the first tick; nothing may be recorded as fired.
        let fired = sched.tick(sgt(2025, 6, 10, 7, 1), &notifier).await;
        assert!(fired.is_empty());

        // Next tick inside the grace window retries and succeeds, once.
        let fired = sched.tick(sgt(2025, 6, 10, 7, 2), &notifier).await;
        assert_eq!(fired.len(), 1);

        let fired = sched.tick(sgt(2025, 6, 10, 7, 3), &notifier).await;
        assert!(fired.is_empty());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failing_trigger_does_not_block_others() {
        // Both triggers come due in the same tick; the first send fails,
        // the second must still be attempted.
        let mut sched = scheduler(vec![def("a", 7, 0), def("b", 7, 0)]);
        let notifier = RecordingNotifier::failing(1);

        let fired = sched.tick(sgt(2025, 6, 10, 7, 1), &notifier).await;

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "b");
    }

    #[tokio::test]
    async fn test_day_rollover_makes_trigger_eligible_again() {
        let mut sched = scheduler(vec![def("a", 7, 0)]);
        let notifier = RecordingNotifier::new();

        let fired = sched.tick(sgt(2025, 6, 10, 7, 3), &notifier).await;
        assert_eq!(fired.len(), 1);

        let fired = sched.tick(sgt(2025, 6, 11, 7, 1), &notifier).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_two_trigger_daily_scenario() {
        let mut sched = scheduler(vec![def("a", 7, 0), def("b", 18, 0)]);
        let notifier = RecordingNotifier::new();

        // 07:03 fires a only.
        let fired = sched.tick(sgt(2025, 6, 10, 7, 3), &notifier).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "a");

        // 07:04 same day fires nothing.
        assert!(sched.tick(sgt(2025, 6, 10, 7, 4), &notifier).await.is_empty());

        // 18:00 fires b.
        let fired = sched.tick(sgt(2025, 6, 10, 18, 0), &notifier).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "b");

        // Next day 07:01 fires a again.
        let fired = sched.tick(sgt(2025, 6, 11, 7, 1), &notifier).await;
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].trigger_id, "a");
    }
}
