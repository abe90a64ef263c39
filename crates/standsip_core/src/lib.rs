//! Core of the Stand & Sip reminder engine.
//! This crate owns the scheduling invariants; hosts only deliver fires,
//! actions and the boot signal.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, PromptText};
pub use model::log_entry::{LogEntry, LogEntryId};
pub use model::settings::{Settings, SettingsValidationError};
pub use repo::log_repo::{LogStore, SqliteLogRepository};
pub use repo::settings_repo::{SettingsStore, SqliteSettingsRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::dispatcher::{ActionDispatcher, DispatchError, DispatchOutcome, UserAction};
pub use schedule::observer::{SchedulerEvent, Subscription};
pub use schedule::runner::{
    DelayedTaskRunner, Notifier, PromptKind, ReminderPayload, SchedulingFailure, TimerHandle,
};
pub use schedule::scheduler::{
    CategorySnapshot, Gated, Outcome, PendingTimer, RearmError, SchedulerService,
    DEFAULT_SNOOZE_MINUTES,
};
pub use schedule::state::{ReminderState, Trigger};
pub use schedule::thread_runner::ThreadTimerRunner;
pub use schedule::window::{is_in_window, next_delay_minutes};
pub use service::history_service::{DailyCounts, HistoryItem, HistoryService};
pub use service::settings_service::{SettingsService, SettingsServiceError};

/// Minimal health-check API for host wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
