//! Wall-clock access for scheduling decisions and "today" queries.
//!
//! Everything that asks "what time is it" goes through [`Clock`], so the
//! window math and day-bound queries stay deterministic under test.

use crate::model::settings::MINUTES_PER_DAY;
use chrono::{
    DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use std::sync::{Mutex, PoisonError};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to a local date and time.
    ///
    /// Returns `None` when the local time does not exist (DST gap).
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .earliest()
            .map(Self::new)
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += Duration::minutes(minutes);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Minutes since local midnight, in `[0, MINUTES_PER_DAY)`.
pub fn minute_of_day(at: &DateTime<Local>) -> u32 {
    (at.hour() * 60 + at.minute()) % MINUTES_PER_DAY
}

/// Epoch-millisecond bounds `[start, end)` of a local calendar day.
pub fn local_day_bounds_ms(day: NaiveDate) -> (i64, i64) {
    let next_day = day.succ_opt().unwrap_or(day);
    (local_midnight_ms(day), local_midnight_ms(next_day))
}

fn local_midnight_ms(day: NaiveDate) -> i64 {
    let midnight = day.and_time(NaiveTime::MIN);
    let start = first_valid_ms(midnight, |local| {
        Local
            .from_local_datetime(local)
            .earliest()
            .map(|at| at.timestamp_millis())
    });
    // No zone skips two whole days.
    start.unwrap_or_else(|| Utc.from_utc_datetime(&midnight).timestamp_millis())
}

/// First instant at or after `from` that exists in local time.
///
/// A day whose midnight falls in a DST gap starts at the end of the gap; a
/// day skipped entirely starts where the next day starts.
fn first_valid_ms(
    from: NaiveDateTime,
    resolve: impl Fn(&NaiveDateTime) -> Option<i64>,
) -> Option<i64> {
    (0..2 * i64::from(MINUTES_PER_DAY))
        .map(|minutes| from + Duration::minutes(minutes))
        .find_map(|local| resolve(&local))
}
