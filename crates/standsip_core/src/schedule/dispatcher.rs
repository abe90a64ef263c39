//! Translation of inbound user actions and timer fires.
//!
//! # Responsibility
//! - Map `(category, action)` pairs onto scheduler transitions.
//! - Append acknowledgement rows for "done" and manual counter changes.
//!
//! # Invariants
//! - Holds no state of its own beyond its collaborators.
//! - Unrecognized actions are a no-op, never an error.
//! - Log writes complete before the call returns; failures are returned,
//!   never dropped.
//! - A "done" whose row cannot be written leaves the prompt outstanding.

use crate::model::category::Category;
use crate::model::log_entry::LogEntryId;
use crate::repo::log_repo::LogStore;
use crate::repo::{RepoError, RepoResult};
use crate::schedule::observer::SchedulerEvent;
use crate::schedule::runner::{ReminderPayload, SchedulingFailure};
use crate::schedule::scheduler::{Gated, Outcome, SchedulerService};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The two actions a prompt exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Done,
    Snooze,
}

impl UserAction {
    /// Parses an action name; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "done" => Some(Self::Done),
            "snooze" => Some(Self::Snooze),
            _ => None,
        }
    }
}

/// What a dispatched action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Prompt acknowledged and logged under `entry_id`.
    Acknowledged { entry_id: LogEntryId },
    /// Prompt postponed by the snooze delay.
    Snoozed,
    /// Stale, duplicate or unrecognized trigger.
    Ignored,
}

#[derive(Debug)]
pub enum DispatchError {
    /// Transition applied but the follow-up timer was refused.
    Scheduling(SchedulingFailure),
    /// The log store rejected the write.
    Store(RepoError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduling(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scheduling(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SchedulingFailure> for DispatchError {
    fn from(value: SchedulingFailure) -> Self {
        Self::Scheduling(value)
    }
}

impl From<RepoError> for DispatchError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Routes actions to the scheduler and the log store.
pub struct ActionDispatcher<'s, L: LogStore> {
    scheduler: &'s SchedulerService,
    log_store: L,
}

impl<'s, L: LogStore> ActionDispatcher<'s, L> {
    pub fn new(scheduler: &'s SchedulerService, log_store: L) -> Self {
        Self {
            scheduler,
            log_store,
        }
    }

    /// Applies `action` to `category`.
    ///
    /// # Errors
    /// - `DispatchError::Store` when "done" could not be logged; the prompt
    ///   and its timer are left as they were.
    /// - `DispatchError::Scheduling` when the replacement timer was refused.
    ///   For "done" the row has already been written.
    pub fn on_action(
        &self,
        category: Category,
        action: UserAction,
    ) -> Result<DispatchOutcome, DispatchError> {
        match action {
            UserAction::Done => self.acknowledge(category),
            UserAction::Snooze => match self.scheduler.snooze(category)? {
                Outcome::Applied(_) => {
                    info!(
                        "event=action_dispatch module=dispatch status=ok category={category} action=snooze"
                    );
                    Ok(DispatchOutcome::Snoozed)
                }
                Outcome::Ignored => Ok(ignored(category, "snooze")),
            },
        }
    }

    /// Applies raw action input from an external trigger.
    ///
    /// Unknown categories or actions are ignored.
    pub fn on_raw_action(
        &self,
        category: &str,
        action: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        match (Category::parse(category), UserAction::parse(action)) {
            (Some(category), Some(action)) => self.on_action(category, action),
            _ => {
                warn!(
                    "event=action_dispatch module=dispatch status=ignored reason=unrecognized category={category} action={action}"
                );
                Ok(DispatchOutcome::Ignored)
            }
        }
    }

    /// Hands a runner fire to the scheduler, dropping superseded fires.
    pub fn on_timer_fired(&self, payload: &ReminderPayload) -> Result<Outcome, SchedulingFailure> {
        self.scheduler.on_timer_fired(payload)
    }

    /// Adds an entry for `category` without touching its timer.
    pub fn record_manual(&self, category: Category) -> RepoResult<LogEntryId> {
        let entry_id = self
            .log_store
            .append(category, self.scheduler.now().timestamp_millis())?;
        info!(
            "event=log_append module=dispatch status=ok category={category} source=manual entry_id={entry_id}"
        );
        self.scheduler
            .publish(SchedulerEvent::LogChanged { category });
        Ok(entry_id)
    }

    /// Removes today's most recent entry of `category`, if any.
    pub fn undo_latest(&self, category: Category) -> RepoResult<bool> {
        let removed = self.log_store.delete_latest_today(category)?;
        info!(
            "event=log_undo module=dispatch status=ok category={category} removed={removed}"
        );
        if removed {
            self.scheduler
                .publish(SchedulerEvent::LogChanged { category });
        }
        Ok(removed)
    }

    fn acknowledge(&self, category: Category) -> Result<DispatchOutcome, DispatchError> {
        let timestamp_ms = self.scheduler.now().timestamp_millis();
        let gated = self
            .scheduler
            .acknowledge_with(category, || self.log_store.append(category, timestamp_ms))
            .map_err(|err| {
                error!(
                    "event=action_dispatch module=dispatch status=error category={category} action=done error={err}"
                );
                err
            })?;

        let (entry_id, rearm) = match gated {
            Gated::Applied { value, rearm, .. } => (value, rearm),
            Gated::Ignored => return Ok(ignored(category, "done")),
        };
        self.scheduler
            .publish(SchedulerEvent::LogChanged { category });
        info!(
            "event=action_dispatch module=dispatch status=ok category={category} action=done entry_id={entry_id}"
        );

        rearm.map_err(DispatchError::Scheduling)?;
        Ok(DispatchOutcome::Acknowledged { entry_id })
    }
}

fn ignored(category: Category, action: &str) -> DispatchOutcome {
    debug!(
        "event=action_dispatch module=dispatch status=ignored reason=no_prompt category={category} action={action}"
    );
    DispatchOutcome::Ignored
}
