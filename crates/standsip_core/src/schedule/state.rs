//! Per-category reminder state machine.
//!
//! ```text
//!            fire                    done
//!   Idle ───────────► Notified ───────────────► Idle
//!    ▲                 │  ▲ │
//!    │                 │  └─┘ fire / snooze
//!    └──── reset ──────┘
//! ```
//!
//! The machine only decides. Cancelling and arming timers, showing prompts
//! and writing log rows are carried out by the scheduler and dispatcher from
//! the returned [`Transition`].

use serde::{Deserialize, Serialize};

/// Lifecycle state of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// No outstanding prompt.
    #[default]
    Idle,
    /// A prompt is shown and waiting for the user.
    Notified,
}

/// Inputs that drive the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The category's pending timer fired.
    Fired,
    /// User acknowledged the prompt.
    Done,
    /// User postponed the prompt.
    Snooze,
    /// Boot or settings change; history is discarded.
    Reset,
}

/// Which delay the next timer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmPlan {
    /// Next window/interval boundary from now.
    Window,
    /// Fixed snooze delay, ignoring the window.
    Snooze,
}

/// Decision produced for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReminderState,
    /// Show the prompt for this category.
    pub show_prompt: bool,
    /// Clear a prompt that is currently shown.
    pub dismiss_prompt: bool,
    /// Append an acknowledgement row.
    pub record_log: bool,
    /// Replacement timer; the old one is always cancelled first.
    pub arm: ArmPlan,
}

impl ReminderState {
    /// Decides the outcome of `trigger` in this state.
    ///
    /// Returns `None` when the trigger does not apply (a done or snooze with
    /// no prompt outstanding), which callers treat as a no-op.
    pub fn on(self, trigger: Trigger) -> Option<Transition> {
        match (self, trigger) {
            (_, Trigger::Fired) => Some(Transition {
                next: Self::Notified,
                show_prompt: true,
                dismiss_prompt: false,
                record_log: false,
                arm: ArmPlan::Window,
            }),
            (Self::Notified, Trigger::Done) => Some(Transition {
                next: Self::Idle,
                show_prompt: false,
                dismiss_prompt: true,
                record_log: true,
                arm: ArmPlan::Window,
            }),
            (Self::Notified, Trigger::Snooze) => Some(Transition {
                next: Self::Notified,
                show_prompt: false,
                dismiss_prompt: false,
                record_log: false,
                arm: ArmPlan::Snooze,
            }),
            (Self::Idle, Trigger::Done | Trigger::Snooze) => None,
            (state, Trigger::Reset) => Some(Transition {
                next: Self::Idle,
                show_prompt: false,
                dismiss_prompt: state == Self::Notified,
                record_log: false,
                arm: ArmPlan::Window,
            }),
        }
    }
}
