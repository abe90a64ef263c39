//! Settings use-cases: save & apply, boot re-arm.
//!
//! # Invariants
//! - Invalid settings never reach the scheduler.
//! - A store failure on load falls back to the scheduler's last-known-good
//!   snapshot (defaults before the first successful load).
//! - A store failure on save is returned and nothing is re-armed.

use crate::model::settings::{Settings, SettingsValidationError};
use crate::repo::settings_repo::SettingsStore;
use crate::repo::RepoError;
use crate::schedule::scheduler::{RearmError, SchedulerService};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SettingsServiceError {
    InvalidSettings(SettingsValidationError),
    Store(RepoError),
    Scheduling(RearmError),
}

impl Display for SettingsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSettings(err) => write!(f, "invalid settings: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Scheduling(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSettings(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Scheduling(err) => Some(err),
        }
    }
}

impl From<RearmError> for SettingsServiceError {
    fn from(value: RearmError) -> Self {
        Self::Scheduling(value)
    }
}

/// Settings facade bound to one scheduler.
pub struct SettingsService<'s, S: SettingsStore> {
    store: S,
    scheduler: &'s SchedulerService,
}

impl<'s, S: SettingsStore> SettingsService<'s, S> {
    pub fn new(store: S, scheduler: &'s SchedulerService) -> Self {
        Self { store, scheduler }
    }

    /// Loads settings, falling back to the last-known-good snapshot.
    pub fn current(&self) -> Settings {
        match self.store.load() {
            Ok(settings) => settings,
            Err(err) => {
                let fallback = self.scheduler.settings();
                warn!(
                    "event=settings_load module=service status=fallback start={} end={} interval={} error={err}",
                    fallback.start_minute, fallback.end_minute, fallback.interval_minute
                );
                fallback
            }
        }
    }

    /// Validates, persists and applies new settings.
    ///
    /// # Errors
    /// - `InvalidSettings` before anything is written.
    /// - `Store` when persistence fails; timers are left untouched.
    /// - `Scheduling` when some categories could not be re-armed.
    pub fn save_and_apply(&self, settings: Settings) -> Result<(), SettingsServiceError> {
        settings
            .validate()
            .map_err(SettingsServiceError::InvalidSettings)?;
        self.store.save(&settings).map_err(|err| match err {
            RepoError::InvalidSettings(err) => SettingsServiceError::InvalidSettings(err),
            other => SettingsServiceError::Store(other),
        })?;
        info!(
            "event=settings_save module=service status=ok start={} end={} interval={}",
            settings.start_minute, settings.end_minute, settings.interval_minute
        );
        self.scheduler.rearm_all(settings)?;
        Ok(())
    }

    /// Boot hook: re-arms every category from the current settings.
    ///
    /// Returns the settings that were applied.
    pub fn on_boot(&self) -> Result<Settings, SettingsServiceError> {
        let settings = self.current();
        info!("event=boot_rearm module=service status=start");
        self.scheduler.rearm_all(settings)?;
        Ok(settings)
    }
}
