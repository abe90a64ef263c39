//! Active-window and interval math.
//!
//! # Responsibility
//! - Answer "how many minutes from now until the next eligible reminder".
//!
//! # Invariants
//! - Pure and total: no state, no I/O, defined for every input.
//! - Returned delays are always `> 0`.
//! - Inside the window the delay lands exactly on an interval multiple
//!   counted from `start_minute` of the same clock day; the function never
//!   looks past that boundary, even when it falls at or after `end_minute`.
//! - Before `start_minute` (the after-midnight part of a wrapped window, or
//!   the early part of a 24-hour window) elapsed minutes are negative and
//!   the slot index truncates toward zero, so unless `now` sits on a slot the
//!   nearest one is skipped: `22:00-06:00 every 120` at `00:30` waits 210
//!   minutes (04:00).

use crate::model::settings::{Settings, MINUTES_PER_DAY};

/// Returns whether `now` lies inside the `[start, end)` window.
///
/// `start > end` wraps past midnight; `start == end` is a 24-hour window.
pub fn is_in_window(now_minute: u32, settings: &Settings) -> bool {
    let now = now_minute % MINUTES_PER_DAY;
    let (start, end) = (settings.start_minute, settings.end_minute);
    if start == end {
        true
    } else if start < end {
        start <= now && now < end
    } else {
        now >= start || now < end
    }
}

/// Minutes from `now_minute` until the next eligible fire time.
pub fn next_delay_minutes(now_minute: u32, settings: &Settings) -> u32 {
    let now = now_minute % MINUTES_PER_DAY;
    let start = settings.start_minute % MINUTES_PER_DAY;

    if !is_in_window(now, settings) {
        return if now < start {
            start - now
        } else {
            (MINUTES_PER_DAY - now) + start
        };
    }

    let step = i64::from(settings.effective_interval());
    let (now, start) = (i64::from(now), i64::from(start));
    let elapsed = now - start;
    // `/` truncates toward zero for negative `elapsed`.
    let next = (elapsed / step + 1) * step + start;
    u32::try_from(next - now).unwrap_or(MINUTES_PER_DAY)
}

/// Minute of day at which a reminder armed at `now_minute` will fire.
pub fn next_fire_minute(now_minute: u32, settings: &Settings) -> u32 {
    (now_minute % MINUTES_PER_DAY + next_delay_minutes(now_minute, settings)) % MINUTES_PER_DAY
}
