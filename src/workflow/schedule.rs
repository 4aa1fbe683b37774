//! Weekly trigger for the scheduled workflow.
//!
//! Fires on the configured weekdays at a fixed local time (default Mon-Fri
//! 15:15, shortly after the close). Each firing is spawned so a slow run
//! never delays the next computation; overlap is handled by the workflow's
//! run-lock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::scheduled::ScheduledWorkflow;
use crate::config::ScheduleConfig;
use crate::session::Clock;

/// Weekdays plus a time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekdays: Vec<Weekday>,
    at: NaiveTime,
}

impl WeeklySchedule {
    /// Returns `None` for an empty weekday set or an invalid time.
    pub fn new(weekdays: Vec<Weekday>, hour: u32, minute: u32) -> Option<Self> {
        if weekdays.is_empty() {
            return None;
        }
        let at = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(Self { weekdays, at })
    }

    pub fn from_config(config: &ScheduleConfig) -> Option<Self> {
        Self::new(config.weekdays.clone(), config.hour, config.minute)
    }

    /// First firing strictly after `now`, in `now`'s offset.
    pub fn next_after(&self, now: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let tz = now.timezone();
        self.next_resolved(now, |local| tz.from_local_datetime(&local).single())
    }

    /// First firing strictly after the clock's `now`, with each candidate
    /// resolved in the clock's zone so a daylight-saving change between now
    /// and the firing is honored.
    pub fn next_fire(&self, clock: &dyn Clock) -> Option<DateTime<FixedOffset>> {
        let now = clock.now();
        self.next_resolved(&now, |local| clock.resolve_local(local))
    }

    fn next_resolved<F>(&self, now: &DateTime<FixedOffset>, resolve: F) -> Option<DateTime<FixedOffset>>
    where
        F: Fn(NaiveDateTime) -> Option<DateTime<FixedOffset>>,
    {
        let today = now.date_naive();

        // Eight days covers "later today" through "same weekday next week".
        // A local time that falls in a DST gap skips that day.
        (0..=7u64).find_map(|ahead| {
            let day = today.checked_add_days(Days::new(ahead))?;
            if !self.weekdays.contains(&day.weekday()) {
                return None;
            }
            let candidate = resolve(day.and_time(self.at))?;
            (candidate > *now).then_some(candidate)
        })
    }
}

impl std::fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days: Vec<String> = self.weekdays.iter().map(ToString::to_string).collect();
        write!(f, "{} at {}", days.join(","), self.at.format("%H:%M"))
    }
}

/// Run the scheduler loop until `cancel_token` fires.
///
/// The wait is a monotonic sleep computed from the wall clock, and it is
/// recomputed after every firing. A wall-clock jump while sleeping (NTP step,
/// manual change) shifts that one firing; the next one is computed afresh.
pub async fn run_scheduler(
    workflow: Arc<ScheduledWorkflow>,
    schedule: WeeklySchedule,
    clock: Arc<dyn Clock>,
    cancel_token: CancellationToken,
) {
    info!(schedule = %schedule, "[Scheduler] Weekly trigger armed");

    loop {
        let Some(next) = schedule.next_fire(clock.as_ref()) else {
            warn!("[Scheduler] No future trigger could be computed, stopping");
            return;
        };
        let wait = (next - clock.now()).to_std().unwrap_or(Duration::ZERO);
        debug!(next = %next, wait_secs = wait.as_secs(), "[Scheduler] Sleeping until next trigger");

        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("[Scheduler] Received shutdown signal");
                return;
            }
            () = tokio::time::sleep(wait) => {
                info!(at = %next, "[Scheduler] Trigger fired");
                let wf = Arc::clone(&workflow);
                tokio::spawn(async move {
                    let outcome = wf.run_once().await;
                    debug!(outcome = ?outcome, "[Scheduler] Run finished");
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cst(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn weekdays_1515() -> WeeklySchedule {
        WeeklySchedule::new(
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            15,
            15,
        )
        .unwrap()
    }

    #[test]
    fn test_later_today() {
        // 2024-05-06 is a Monday.
        let next = weekdays_1515().next_after(&cst(2024, 5, 6, 9, 0)).unwrap();
        assert_eq!(next, cst(2024, 5, 6, 15, 15));
    }

    #[test]
    fn test_exactly_at_trigger_moves_to_next_day() {
        let next = weekdays_1515().next_after(&cst(2024, 5, 6, 15, 15)).unwrap();
        assert_eq!(next, cst(2024, 5, 7, 15, 15));
    }

    #[test]
    fn test_friday_evening_skips_weekend() {
        // 2024-05-10 is a Friday.
        let next = weekdays_1515().next_after(&cst(2024, 5, 10, 18, 0)).unwrap();
        assert_eq!(next, cst(2024, 5, 13, 15, 15));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_single_day_wraps_a_full_week() {
        let schedule = WeeklySchedule::new(vec![Weekday::Mon], 15, 15).unwrap();
        let next = schedule.next_after(&cst(2024, 5, 6, 16, 0)).unwrap();
        assert_eq!(next, cst(2024, 5, 13, 15, 15));
    }

    #[test]
    fn test_invalid_schedules_are_rejected() {
        assert!(WeeklySchedule::new(Vec::new(), 15, 15).is_none());
        assert!(WeeklySchedule::new(vec![Weekday::Mon], 24, 0).is_none());
        assert!(WeeklySchedule::new(vec![Weekday::Mon], 10, 60).is_none());
    }

    /// Clock sitting at +01:00 whose zone moves to +02:00 for every local
    /// time it resolves, like a spring-forward weekend.
    struct SpringForwardClock(DateTime<FixedOffset>);

    impl Clock for SpringForwardClock {
        fn now(&self) -> DateTime<FixedOffset> {
            self.0
        }

        fn resolve_local(&self, local: chrono::NaiveDateTime) -> Option<DateTime<FixedOffset>> {
            FixedOffset::east_opt(2 * 3600)?.from_local_datetime(&local).single()
        }
    }

    #[test]
    fn test_next_fire_uses_offset_of_the_firing_day() {
        // Friday 2024-03-29 18:00 +01:00; next firing is Monday 15:15 +02:00.
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 29, 18, 0, 0)
            .unwrap();
        let clock = SpringForwardClock(now);

        let next = weekdays_1515().next_fire(&clock).unwrap();

        assert_eq!(next.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(next.naive_local().to_string(), "2024-04-01 15:15:00");
        // Frozen offset would be an hour late.
        let frozen = weekdays_1515().next_after(&now).unwrap();
        assert_eq!((frozen - next).num_minutes(), 60);
    }

    #[test]
    fn test_next_fire_matches_next_after_for_fixed_offset() {
        let clock = crate::session::FixedClock(cst(2024, 5, 10, 18, 0));
        assert_eq!(
            weekdays_1515().next_fire(&clock),
            weekdays_1515().next_after(&cst(2024, 5, 10, 18, 0))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(weekdays_1515().to_string(), "Mon,Tue,Wed,Thu,Fri at 15:15");
    }
}
