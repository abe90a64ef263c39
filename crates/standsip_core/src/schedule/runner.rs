//! Delayed-task runner and notifier contracts.
//!
//! # Responsibility
//! - Describe the platform facilities the scheduler arms timers against and
//!   delivers prompts through.
//!
//! # Invariants
//! - A runner fires each armed payload at most once.
//! - Re-arming after a fire is the scheduler's job, never the runner's.

use crate::model::category::{Category, PromptText};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identity of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub Uuid);

impl TimerHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TimerHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which prompt text a fire should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Regular,
    Snoozed,
}

/// Data handed to the runner and returned to the scheduler on fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub category: Category,
    pub kind: PromptKind,
    /// Arm generation of the category; stale fires carry an old value.
    pub generation: u64,
}

impl ReminderPayload {
    pub fn prompt(&self) -> PromptText {
        match self.kind {
            PromptKind::Regular => self.category.prompt(),
            PromptKind::Snoozed => self.category.snoozed_prompt(),
        }
    }
}

/// The runner refused to arm a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingFailure {
    pub category: Category,
    pub reason: String,
}

impl SchedulingFailure {
    pub fn new(category: Category, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
        }
    }
}

impl Display for SchedulingFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to arm timer for {}: {}",
            self.category, self.reason
        )
    }
}

impl Error for SchedulingFailure {}

/// Platform facility that invokes a callback once after a delay.
pub trait DelayedTaskRunner: Send + Sync {
    fn arm(
        &self,
        category: Category,
        delay_minutes: u32,
        payload: ReminderPayload,
    ) -> Result<TimerHandle, SchedulingFailure>;

    /// Cancels every pending timer carrying `tag`.
    fn cancel_by_tag(&self, tag: &str);
}

/// User-visible alert sink.
pub trait Notifier: Send + Sync {
    fn show(&self, category: Category, title: &str, body: &str);

    /// Clears a shown prompt. Sinks without persistent prompts ignore it.
    fn dismiss(&self, _category: Category) {}
}
