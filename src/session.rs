//! Market session classification and the wall-clock seam.
//!
//! The exchange opens at 09:00 and closes at 15:00 local time. The session
//! label only changes how a report is framed; it never changes what is
//! analyzed.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// First hour that is no longer pre-market.
const OPEN_HOUR: u32 = 9;

/// First hour that is post-market.
const CLOSE_HOUR: u32 = 15;

/// Coarse position of "now" relative to the trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionLabel {
    /// Before the open: advice is based on the prior close and applies today.
    PreMarket,
    /// After the close: advice applies to the next session.
    PostMarket,
    /// Market is live.
    IntraDay,
}

impl SessionLabel {
    /// Classify a local hour (0-23).
    pub const fn from_hour(hour: u32) -> Self {
        if hour < OPEN_HOUR {
            Self::PreMarket
        } else if hour >= CLOSE_HOUR {
            Self::PostMarket
        } else {
            Self::IntraDay
        }
    }

    /// Reader-facing note printed in the report header.
    pub const fn note(self) -> &'static str {
        match self {
            Self::PreMarket => "[Pre-market alert] The market has not opened yet. The suggestions below are based on the previous close and apply to today's session.",
            Self::PostMarket => "[Post-market review] Today's session has closed. The suggestions below apply to the next trading session.",
            Self::IntraDay => "[Intraday reference] The market is trading now. Data may still fluctuate.",
        }
    }
}

impl std::fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreMarket => write!(f, "PreMarket"),
            Self::PostMarket => write!(f, "PostMarket"),
            Self::IntraDay => write!(f, "IntraDay"),
        }
    }
}

/// Classify a timestamp by its hour in its own time zone.
pub fn classify<Tz: TimeZone>(now: &DateTime<Tz>) -> SessionLabel {
    SessionLabel::from_hour(now.hour())
}

// ============================================================================
// Clock
// ============================================================================

/// Source of "now" for the workflow.
///
/// Production uses [`SystemClock`]; tests pin the time with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Pin a local wall-clock time to an instant in this clock's zone.
    ///
    /// The default reuses the offset of `now()`. Zones with daylight saving
    /// override this so a time on the far side of a transition gets that
    /// day's offset. `None` when the local time does not exist.
    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.now().timezone().from_local_datetime(&local).single()
    }
}

/// Wall clock, either in the host's zone or at a fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Host local time zone.
    pub const fn local() -> Self {
        Self { offset: None }
    }

    /// Fixed offset from UTC, in minutes. Out-of-range offsets fall back to
    /// local time.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        Self {
            offset: FixedOffset::east_opt(minutes * 60),
        }
    }

    pub fn from_config(utc_offset_minutes: Option<i32>) -> Self {
        utc_offset_minutes.map_or_else(Self::local, Self::with_offset_minutes)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self.offset {
            Some(offset) => offset.from_local_datetime(&local).single(),
            // A repeated hour at fall-back fires on its first occurrence.
            None => Local
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        }
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_hour(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 6, hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_documented_hours() {
        assert_eq!(classify(&at_hour(8)), SessionLabel::PreMarket);
        assert_eq!(classify(&at_hour(9)), SessionLabel::IntraDay);
        assert_eq!(classify(&at_hour(14)), SessionLabel::IntraDay);
        assert_eq!(classify(&at_hour(15)), SessionLabel::PostMarket);
        assert_eq!(classify(&at_hour(23)), SessionLabel::PostMarket);
    }

    #[test]
    fn test_every_hour_maps_to_one_label() {
        for hour in 0..24 {
            let expected = if hour < 9 {
                SessionLabel::PreMarket
            } else if hour < 15 {
                SessionLabel::IntraDay
            } else {
                SessionLabel::PostMarket
            };
            assert_eq!(SessionLabel::from_hour(hour), expected, "hour {hour}");
        }
    }

    #[test]
    fn test_classify_uses_local_hour_not_utc() {
        // 08:30 at UTC+8 is 00:30 UTC; both are pre-market, so use 16:30 UTC+8
        // (08:30 UTC) to make sure the local hour wins.
        let local = at_hour(16);
        assert_eq!(classify(&local), SessionLabel::PostMarket);
        assert_eq!(classify(&local.with_timezone(&Utc)), SessionLabel::PreMarket);
    }

    #[test]
    fn test_notes_are_distinct() {
        let notes = [
            SessionLabel::PreMarket.note(),
            SessionLabel::PostMarket.note(),
            SessionLabel::IntraDay.note(),
        ];
        assert_ne!(notes[0], notes[1]);
        assert_ne!(notes[1], notes[2]);
        assert_ne!(notes[0], notes[2]);
    }

    #[test]
    fn test_system_clock_respects_offset() {
        let clock = SystemClock::with_offset_minutes(480);
        assert_eq!(clock.now().offset().local_minus_utc(), 480 * 60);
    }

    #[test]
    fn test_resolve_local_uses_configured_offset() {
        let clock = SystemClock::with_offset_minutes(480);
        let local = at_hour(15).naive_local();
        let resolved = clock.resolve_local(local).unwrap();
        assert_eq!(resolved, at_hour(15));
    }

    #[test]
    fn test_fixed_clock_is_frozen() {
        let clock = FixedClock(at_hour(10));
        assert_eq!(clock.now(), clock.now());
    }
}
