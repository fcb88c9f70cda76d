//! crates/manifestly_core/src/streak.rs
//!
//! Current-streak calculation: the number of consecutive calendar days,
//! counting back from today, on which at least one session was recorded.
//!
//! The calculation is pure. "Now" and the zone in which days are cut are
//! both supplied by the caller, so results are deterministic in tests and
//! independent of the host's local zone.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

use crate::domain::Session;

/// Anything that carries the creation timestamp the streak is computed from.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl Timestamped for DateTime<Utc> {
    fn created_at(&self) -> DateTime<Utc> {
        *self
    }
}

impl Timestamped for Session {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn created_at(&self) -> DateTime<Utc> {
        (**self).created_at()
    }
}

/// Truncates a timestamp to its calendar day in `tz`.
pub fn date_key<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// Returns the current streak length in days.
///
/// A positive streak requires a record dated today; multiple records on the
/// same day count once, and the walk stops at the first missing day.
pub fn current_streak<I, Tz>(records: I, now: DateTime<Utc>, tz: &Tz) -> u32
where
    I: IntoIterator,
    I::Item: Timestamped,
    Tz: TimeZone,
{
    let days: BTreeSet<NaiveDate> = records
        .into_iter()
        .map(|record| date_key(record.created_at(), tz))
        .collect();

    if days.is_empty() {
        return 0;
    }

    let today = date_key(now, tz);
    let mut streak = 0;
    for (offset, day) in days.iter().rev().enumerate() {
        let expected = today.checked_sub_days(Days::new(offset as u64));
        if expected != Some(*day) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Convenience wrapper for a fetched list of sessions.
pub fn streak_for_sessions<Tz: TimeZone>(sessions: &[Session], now: DateTime<Utc>, tz: &Tz) -> u32 {
    current_streak(sessions, now, tz)
}
