//! Per-category timer orchestration.
//!
//! # Responsibility
//! - Own the single pending timer of every category.
//! - Apply state-machine decisions: cancel, arm, show, dismiss.
//! - Keep the last-known-good settings snapshot.
//!
//! # Invariants
//! - At most one pending timer per category; every arm is preceded by a
//!   tag-scoped cancel under the category lock.
//! - Transitions of one category are serialized by its lock; different
//!   categories never block each other.
//! - The cancel/arm pair is never split by store I/O. An acknowledgement row
//!   is written under the category lock before any timer is touched; if it
//!   fails, nothing changes.
//! - A rejected arm leaves the category un-armed and is reported, never
//!   retried here.

use crate::clock::{minute_of_day, Clock};
use crate::model::category::Category;
use crate::model::settings::Settings;
use crate::schedule::observer::{EventHub, SchedulerEvent, Subscription};
use crate::schedule::runner::{
    DelayedTaskRunner, Notifier, PromptKind, ReminderPayload, SchedulingFailure, TimerHandle,
};
use crate::schedule::state::{ArmPlan, ReminderState, Transition, Trigger};
use crate::schedule::window::next_delay_minutes;
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

/// Fixed delay used by snooze, independent of the active window.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 5;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// The single live timer of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingTimer {
    pub handle: TimerHandle,
    pub generation: u64,
    pub kind: PromptKind,
    pub delay_minutes: u32,
    /// Epoch milliseconds at which the runner is expected to fire.
    pub due_at_ms: i64,
}

/// Point-in-time view of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub category: Category,
    pub state: ReminderState,
    pub pending: Option<PendingTimer>,
}

/// Result of feeding one trigger into the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transition was applied.
    Applied(Transition),
    /// The trigger did not apply in the current state, or was stale.
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Result of a transition that first ran a caller-supplied step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    /// The trigger did not apply; the step was not run.
    Ignored,
    /// The step succeeded and the transition was applied.
    Applied {
        transition: Transition,
        value: T,
        /// Outcome of arming the replacement timer.
        rearm: Result<(), SchedulingFailure>,
    },
}

/// One or more categories could not be re-armed by `rearm_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RearmError {
    pub failures: Vec<SchedulingFailure>,
}

impl Display for RearmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let categories = self
            .failures
            .iter()
            .map(|failure| failure.category.log_key())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "failed to re-arm categories: {categories}")
    }
}

impl Error for RearmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.failures.first().map(|failure| failure as &(dyn Error + 'static))
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: ReminderState,
    pending: Option<PendingTimer>,
    generation: u64,
}

/// Reminder scheduler shared by the dispatcher, settings service and host.
pub struct SchedulerService {
    runner: Arc<dyn DelayedTaskRunner>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: RwLock<Settings>,
    slots: [Mutex<Slot>; Category::COUNT],
    snooze_minutes: u32,
    events: EventHub,
}

impl SchedulerService {
    /// Creates a scheduler with default settings and nothing armed.
    pub fn new(
        runner: Arc<dyn DelayedTaskRunner>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            runner,
            notifier,
            clock,
            settings: RwLock::new(Settings::default()),
            slots: std::array::from_fn(|_| Mutex::new(Slot::default())),
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
            events: EventHub::new(),
        }
    }

    /// Overrides the snooze delay.
    pub fn with_snooze_minutes(mut self, minutes: u32) -> Self {
        self.snooze_minutes = minutes.max(1);
        self
    }

    /// Seeds the last-known-good settings without arming anything.
    pub fn with_settings(self, settings: Settings) -> Self {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
        self
    }

    /// Last settings handed to `rearm_all` (or the seed/defaults).
    pub fn settings(&self) -> Settings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snooze_minutes(&self) -> u32 {
        self.snooze_minutes
    }

    /// Registers an observer; it stays registered while the handle lives.
    pub fn subscribe(
        &self,
        listener: impl Fn(&SchedulerEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.events.subscribe(listener)
    }

    pub(crate) fn publish(&self, event: SchedulerEvent) {
        self.events.publish(&event);
    }

    pub(crate) fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Cancels and re-arms every category from the window, resetting state.
    ///
    /// Safe to call repeatedly; each call computes delays from the current
    /// time, not from any earlier arm.
    ///
    /// # Errors
    /// - `RearmError` listing every category the runner refused. The other
    ///   categories are still armed.
    pub fn rearm_all(&self, settings: Settings) -> Result<(), RearmError> {
        let started_at = Instant::now();
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;

        let failures = Category::ALL
            .into_iter()
            .filter_map(|category| self.drive(category, Trigger::Reset, None).err())
            .collect::<Vec<_>>();

        if failures.is_empty() {
            info!(
                "event=rearm_all module=schedule status=ok start={} end={} interval={} duration_ms={}",
                settings.start_minute,
                settings.end_minute,
                settings.interval_minute,
                started_at.elapsed().as_millis()
            );
            Ok(())
        } else {
            error!(
                "event=rearm_all module=schedule status=error failed={} duration_ms={}",
                failures.len(),
                started_at.elapsed().as_millis()
            );
            Err(RearmError { failures })
        }
    }

    /// Handles a fire of `category`'s timer and arms the next occurrence.
    ///
    /// # Errors
    /// - `SchedulingFailure` when the follow-up timer could not be armed. The
    ///   prompt is still shown.
    pub fn on_fire(&self, category: Category) -> Result<Outcome, SchedulingFailure> {
        self.drive(category, Trigger::Fired, None)
    }

    /// Handles a fire delivered with its runner payload.
    ///
    /// Fires whose generation no longer matches the pending timer were
    /// superseded by a later arm and are ignored.
    pub fn on_timer_fired(&self, payload: &ReminderPayload) -> Result<Outcome, SchedulingFailure> {
        self.drive(payload.category, Trigger::Fired, Some(payload.generation))
    }

    /// User acknowledged the prompt of `category`.
    pub fn acknowledge(&self, category: Category) -> Result<Outcome, SchedulingFailure> {
        self.drive(category, Trigger::Done, None)
    }

    /// Acknowledges the prompt of `category` once `record` succeeds.
    ///
    /// `record` runs under the category lock, after the state check and
    /// before any timer or prompt is touched. It is skipped when there is no
    /// prompt outstanding.
    ///
    /// # Errors
    /// - The error of `record`. The prompt stays outstanding and its timer
    ///   untouched, so the acknowledgement can be retried.
    pub fn acknowledge_with<T, E>(
        &self,
        category: Category,
        record: impl FnOnce() -> Result<T, E>,
    ) -> Result<Gated<T>, E> {
        self.drive_gated(category, Trigger::Done, None, record)
    }

    /// User postponed the prompt of `category`.
    pub fn snooze(&self, category: Category) -> Result<Outcome, SchedulingFailure> {
        self.drive(category, Trigger::Snooze, None)
    }

    /// Removes any pending timer of `category` without changing its state.
    pub fn cancel(&self, category: Category) {
        let cancelled = {
            let mut slot = self.lock_slot(category);
            self.runner.cancel_by_tag(category.tag());
            slot.pending.take().is_some()
        };
        if cancelled {
            debug!("event=timer_cancel module=schedule status=ok category={category}");
            self.publish(SchedulerEvent::Cancelled { category });
        }
    }

    pub fn state(&self, category: Category) -> ReminderState {
        self.lock_slot(category).state
    }

    pub fn pending(&self, category: Category) -> Option<PendingTimer> {
        self.lock_slot(category).pending
    }

    pub fn snapshot(&self) -> Vec<CategorySnapshot> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let slot = self.lock_slot(category);
                CategorySnapshot {
                    category,
                    state: slot.state,
                    pending: slot.pending,
                }
            })
            .collect()
    }

    fn drive(
        &self,
        category: Category,
        trigger: Trigger,
        expected_generation: Option<u64>,
    ) -> Result<Outcome, SchedulingFailure> {
        let gated = self.drive_gated(category, trigger, expected_generation, || {
            Ok::<(), Infallible>(())
        });
        match gated {
            Ok(Gated::Ignored) => Ok(Outcome::Ignored),
            Ok(Gated::Applied {
                transition, rearm, ..
            }) => rearm.map(|()| Outcome::Applied(transition)),
            Err(never) => match never {},
        }
    }

    fn drive_gated<T, E>(
        &self,
        category: Category,
        trigger: Trigger,
        expected_generation: Option<u64>,
        gate: impl FnOnce() -> Result<T, E>,
    ) -> Result<Gated<T>, E> {
        let mut events = Vec::new();
        let (transition, value, rearm) = {
            let mut slot = self.lock_slot(category);

            if let Some(generation) = expected_generation {
                let current = slot.pending.map(|pending| pending.generation);
                if current != Some(generation) {
                    warn!(
                        "event=timer_fire module=schedule status=stale category={category} generation={generation}"
                    );
                    return Ok(Gated::Ignored);
                }
            }

            let Some(transition) = slot.state.on(trigger) else {
                debug!(
                    "event=transition module=schedule status=ignored category={category} trigger={trigger:?} state={:?}",
                    slot.state
                );
                return Ok(Gated::Ignored);
            };

            let value = gate()?;

            let fired_kind = slot
                .pending
                .map_or(PromptKind::Regular, |pending| pending.kind);

            self.runner.cancel_by_tag(category.tag());
            if slot.pending.take().is_some() {
                events.push(SchedulerEvent::Cancelled { category });
            }

            let rearm = match self.arm_locked(&mut slot, category, transition.arm) {
                Ok(pending) => {
                    events.push(SchedulerEvent::Armed {
                        category,
                        delay_minutes: pending.delay_minutes,
                        kind: pending.kind,
                        generation: pending.generation,
                    });
                    Ok(())
                }
                Err(failure) => {
                    events.push(SchedulerEvent::ArmFailed {
                        category,
                        reason: failure.reason.clone(),
                    });
                    Err(failure)
                }
            };
            slot.state = transition.next;

            if transition.show_prompt {
                let prompt = match fired_kind {
                    PromptKind::Regular => category.prompt(),
                    PromptKind::Snoozed => category.snoozed_prompt(),
                };
                self.notifier.show(category, prompt.title, prompt.body);
                events.push(SchedulerEvent::Fired { category });
            }
            if transition.dismiss_prompt {
                self.notifier.dismiss(category);
            }
            match trigger {
                Trigger::Done => events.push(SchedulerEvent::Acknowledged { category }),
                Trigger::Snooze => events.push(SchedulerEvent::Snoozed { category }),
                Trigger::Fired | Trigger::Reset => {}
            }

            (transition, value, rearm)
        };

        for event in events {
            self.publish(event);
        }

        Ok(Gated::Applied {
            transition,
            value,
            rearm,
        })
    }

    fn arm_locked(
        &self,
        slot: &mut Slot,
        category: Category,
        plan: ArmPlan,
    ) -> Result<PendingTimer, SchedulingFailure> {
        let now = self.clock.now();
        let (delay_minutes, kind) = match plan {
            ArmPlan::Window => (
                next_delay_minutes(minute_of_day(&now), &self.settings()),
                PromptKind::Regular,
            ),
            ArmPlan::Snooze => (self.snooze_minutes, PromptKind::Snoozed),
        };

        slot.generation += 1;
        let payload = ReminderPayload {
            category,
            kind,
            generation: slot.generation,
        };

        match self.runner.arm(category, delay_minutes, payload) {
            Ok(handle) => {
                let pending = PendingTimer {
                    handle,
                    generation: slot.generation,
                    kind,
                    delay_minutes,
                    due_at_ms: now.timestamp_millis()
                        + i64::from(delay_minutes) * MILLIS_PER_MINUTE,
                };
                slot.pending = Some(pending);
                info!(
                    "event=timer_arm module=schedule status=ok category={category} kind={kind:?} delay_min={delay_minutes} generation={}",
                    slot.generation
                );
                Ok(pending)
            }
            Err(failure) => {
                error!(
                    "event=timer_arm module=schedule status=error category={category} delay_min={delay_minutes} error={}",
                    failure.reason
                );
                Err(failure)
            }
        }
    }

    fn lock_slot(&self, category: Category) -> MutexGuard<'_, Slot> {
        self.slots[category.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
