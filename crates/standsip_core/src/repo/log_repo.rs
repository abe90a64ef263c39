//! Acknowledgement log contract and SQLite implementation.
//!
//! # Responsibility
//! - Append acknowledgement rows and answer per-day counts.
//! - Support "undo latest today" as the only delete path.
//!
//! # Invariants
//! - Rows are never updated.
//! - "Today" is the local calendar day of the repository clock.
//! - `list_all` is ordered by timestamp ascending.

use crate::clock::{local_day_bounds_ms, Clock, SystemClock};
use crate::model::category::Category;
use crate::model::log_entry::{LogEntry, LogEntryId};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::Arc;

/// Append-only store of acknowledgement events.
pub trait LogStore {
    fn append(&self, category: Category, timestamp_ms: i64) -> RepoResult<LogEntryId>;
    fn count_today(&self, category: Category) -> RepoResult<u32>;
    fn delete_latest_today(&self, category: Category) -> RepoResult<bool>;
    fn list_all(&self) -> RepoResult<Vec<LogEntry>>;
}

/// SQLite-backed log store.
pub struct SqliteLogRepository<'conn> {
    conn: &'conn Connection,
    clock: Arc<dyn Clock>,
}

impl<'conn> SqliteLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    /// Uses `clock` to decide which calendar day is "today".
    pub fn with_clock(conn: &'conn Connection, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }

    /// Counts entries of `category` on the given local day.
    pub fn count_on_day(&self, category: Category, day: NaiveDate) -> RepoResult<u32> {
        let (start_ms, end_ms) = local_day_bounds_ms(day);
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM log_entries
             WHERE type = ?1 AND timestamp >= ?2 AND timestamp < ?3;",
            params![category.log_key(), start_ms, end_ms],
            |row| row.get(0),
        )?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("log count `{count}` out of range")))
    }

    /// Deletes the most recent entry of `category` on the given local day.
    pub fn delete_latest_on_day(&self, category: Category, day: NaiveDate) -> RepoResult<bool> {
        let (start_ms, end_ms) = local_day_bounds_ms(day);
        let changed = self.conn.execute(
            "DELETE FROM log_entries
             WHERE id IN (
                SELECT id FROM log_entries
                WHERE type = ?1 AND timestamp >= ?2 AND timestamp < ?3
                ORDER BY timestamp DESC, id DESC
                LIMIT 1
             );",
            params![category.log_key(), start_ms, end_ms],
        )?;
        Ok(changed > 0)
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}

impl LogStore for SqliteLogRepository<'_> {
    fn append(&self, category: Category, timestamp_ms: i64) -> RepoResult<LogEntryId> {
        self.conn.execute(
            "INSERT INTO log_entries (type, timestamp) VALUES (?1, ?2);",
            params![category.log_key(), timestamp_ms],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_today(&self, category: Category) -> RepoResult<u32> {
        self.count_on_day(category, self.today())
    }

    fn delete_latest_today(&self, category: Category) -> RepoResult<bool> {
        self.delete_latest_on_day(category, self.today())
    }

    fn list_all(&self) -> RepoResult<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, timestamp FROM log_entries ORDER BY timestamp ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<LogEntry> {
    let type_text: String = row.get("type")?;
    let category = Category::from_log_key(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid log type `{type_text}` in log_entries.type"))
    })?;

    Ok(LogEntry {
        id: row.get("id")?,
        category,
        timestamp_ms: row.get("timestamp")?,
    })
}
