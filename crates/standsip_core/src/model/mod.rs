//! Reminder domain model.
//!
//! # Responsibility
//! - Define the value types shared by scheduling, persistence and services.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - `Settings` values are immutable snapshots, replaced wholesale on save.
//! - `Category` is a closed set; categories never interact with each other.
//! - `LogEntry` rows are append-only and never updated in place.

pub mod category;
pub mod log_entry;
pub mod settings;
