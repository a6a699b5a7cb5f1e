//! Calendar-day utilities
//!
//! Quests, guards and streaks work on calendar days, not rolling 24h windows.
//! Day keys are "YYYY-MM-DD" strings.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};
use tracing::warn;

/// Day key for a date, in format "YYYY-MM-DD".
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a "YYYY-MM-DD" day key.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Signed number of days from `earlier` to `later`.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Calendar day of `now` for a day boundary at `offset` from UTC.
pub fn day_at(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Source of "now" and "today" for the progression engine
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day `now` falls on for the configured day boundary
    fn today(&self) -> NaiveDate;
}

/// Wall clock. Without an offset the server-local calendar day is used.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Offsets outside +/- 24h are ignored with a warning.
    pub fn new(utc_offset_minutes: Option<i32>) -> Self {
        let offset = utc_offset_minutes.and_then(|minutes| {
            let offset = minutes.checked_mul(60).and_then(FixedOffset::east_opt);
            if offset.is_none() {
                warn!(
                    "[nq:progress] utc_offset_minutes {} out of range, using local time",
                    minutes
                );
            }
            offset
        });
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        match self.offset {
            Some(offset) => day_at(Utc::now(), offset),
            None => Local::now().date_naive(),
        }
    }
}

/// Manually driven clock; the calendar day is the UTC date of `now`
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock at noon UTC of the given day
    pub fn at_day(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self::new(noon)
    }

    pub fn advance_days(&self, days: i64) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += Duration::days(days);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|g| *g)
            .unwrap_or_else(|p| *p.into_inner())
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
