//! Acknowledgement log entry.
//!
//! # Invariants
//! - `id` is assigned by the log store and never reused.
//! - `timestamp_ms` is Unix epoch milliseconds.

use crate::model::category::Category;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of one log row.
pub type LogEntryId = i64;

/// One recorded acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub category: Category,
    pub timestamp_ms: i64,
}
