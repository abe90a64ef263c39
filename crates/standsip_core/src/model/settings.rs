//! Active window and interval settings.
//!
//! # Responsibility
//! - Define the user-facing schedule configuration.
//! - Validate settings at the save boundary.
//!
//! # Invariants
//! - `start_minute` and `end_minute` are minutes since local midnight in
//!   `[0, MINUTES_PER_DAY)`.
//! - `interval_minute` is at least `MIN_INTERVAL_MINUTES` once validated.
//! - `start_minute >= end_minute` denotes a window that wraps past midnight;
//!   `start_minute == end_minute` is a full 24-hour window.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of minutes in one local day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Lower bound for the reminder interval.
pub const MIN_INTERVAL_MINUTES: u32 = 15;

/// Default window start (08:00).
pub const DEFAULT_START_MINUTE: u32 = 8 * 60;

/// Default window end (20:00).
pub const DEFAULT_END_MINUTE: u32 = 20 * 60;

/// Default interval between reminders.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// Daily active window plus reminder interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    /// Window start, minutes since local midnight.
    pub start_minute: u32,
    /// Window end (exclusive), minutes since local midnight.
    pub end_minute: u32,
    /// Spacing between reminders inside the window.
    pub interval_minute: u32,
}

/// Validation errors for [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsValidationError {
    StartOutOfRange(u32),
    EndOutOfRange(u32),
    IntervalTooShort(u32),
}

impl Display for SettingsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartOutOfRange(value) => write!(
                f,
                "start minute {value} is outside 0..{MINUTES_PER_DAY}"
            ),
            Self::EndOutOfRange(value) => {
                write!(f, "end minute {value} is outside 0..{MINUTES_PER_DAY}")
            }
            Self::IntervalTooShort(value) => write!(
                f,
                "interval {value} is shorter than the {MIN_INTERVAL_MINUTES} minute minimum"
            ),
        }
    }
}

impl Error for SettingsValidationError {}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_minute: DEFAULT_START_MINUTE,
            end_minute: DEFAULT_END_MINUTE,
            interval_minute: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl Settings {
    /// Builds validated settings.
    ///
    /// # Errors
    /// - Returns the first violated rule from [`Settings::validate`].
    pub fn new(
        start_minute: u32,
        end_minute: u32,
        interval_minute: u32,
    ) -> Result<Self, SettingsValidationError> {
        let settings = Self {
            start_minute,
            end_minute,
            interval_minute,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks minute ranges and the interval floor.
    pub fn validate(&self) -> Result<(), SettingsValidationError> {
        if self.start_minute >= MINUTES_PER_DAY {
            return Err(SettingsValidationError::StartOutOfRange(self.start_minute));
        }
        if self.end_minute >= MINUTES_PER_DAY {
            return Err(SettingsValidationError::EndOutOfRange(self.end_minute));
        }
        if self.interval_minute < MIN_INTERVAL_MINUTES {
            return Err(SettingsValidationError::IntervalTooShort(
                self.interval_minute,
            ));
        }
        Ok(())
    }

    /// Interval with the minimum floor applied.
    ///
    /// Window math always goes through this accessor so unvalidated values
    /// cannot cause runaway scheduling.
    pub fn effective_interval(&self) -> u32 {
        self.interval_minute.max(MIN_INTERVAL_MINUTES)
    }

    /// Returns whether the window wraps past local midnight.
    pub fn is_overnight(&self) -> bool {
        self.start_minute > self.end_minute
    }
}

/// Formats minutes since midnight as `HH:MM`.
pub fn minute_label(minute_of_day: u32) -> String {
    let minute = minute_of_day % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
