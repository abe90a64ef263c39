//! Reminder categories.
//!
//! # Responsibility
//! - Enumerate the independent reminder streams.
//! - Own the stable string keys used by timers, storage and the CLI.
//!
//! # Invariants
//! - Timer tags and log keys are unique per category and never change, since
//!   both are persisted outside this process.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One independent reminder stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Stand up for a few seconds.
    Stand,
    /// Drink some water.
    Water,
    /// Take a bathroom break.
    Bathroom,
}

/// Title and body shown by the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptText {
    pub title: &'static str,
    pub body: &'static str,
}

const SNOOZED_PROMPT: PromptText = PromptText {
    title: "Snoozed reminder",
    body: "You postponed this reminder ⏰",
};

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 3;

    /// All categories, in display order.
    pub const ALL: [Category; Self::COUNT] = [Category::Stand, Category::Water, Category::Bathroom];

    /// Dense index into per-category tables.
    pub fn index(self) -> usize {
        match self {
            Self::Stand => 0,
            Self::Water => 1,
            Self::Bathroom => 2,
        }
    }

    /// Tag scoping this category's pending timer.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Stand => "stand_stream",
            Self::Water => "water_stream",
            Self::Bathroom => "bath_stream",
        }
    }

    /// Key stored in `log_entries.type`.
    pub fn log_key(self) -> &'static str {
        match self {
            Self::Stand => "stand",
            Self::Water => "water",
            Self::Bathroom => "bath",
        }
    }

    /// Human label used in history listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Stand => "🪑 Stand",
            Self::Water => "💧 Water",
            Self::Bathroom => "🚻 Bathroom",
        }
    }

    /// Prompt text for a regular window-driven reminder.
    pub fn prompt(self) -> PromptText {
        match self {
            Self::Stand => PromptText {
                title: "Time to stand",
                body: "Let’s do 10 seconds on your feet ❤️",
            },
            Self::Water => PromptText {
                title: "Hydration check",
                body: "Have a sip of water 💧",
            },
            Self::Bathroom => PromptText {
                title: "Bathroom check",
                body: "Quick bathroom break 🚻",
            },
        }
    }

    /// Prompt text for a reminder re-fired after snooze.
    pub fn snoozed_prompt(self) -> PromptText {
        SNOOZED_PROMPT
    }

    /// Parses a log key (`stand|water|bath`).
    pub fn from_log_key(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.log_key() == value)
    }

    /// Parses a timer tag (`stand_stream|water_stream|bath_stream`).
    pub fn from_tag(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.tag() == value)
    }

    /// Lenient parser for user input: accepts log keys, tags and aliases.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "stand" | "stand_stream" => Some(Self::Stand),
            "water" | "hydrate" | "water_stream" => Some(Self::Water),
            "bath" | "bathroom" | "bath_stream" => Some(Self::Bathroom),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.log_key())
    }
}
