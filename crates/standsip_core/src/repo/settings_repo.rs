//! Settings store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the schedule settings as key/value rows.
//! - Fill unset keys with defaults on load.
//!
//! # Invariants
//! - `save` writes all three keys in one transaction.
//! - `load` after `save(s)` returns `s`.

use crate::model::settings::{
    Settings, DEFAULT_END_MINUTE, DEFAULT_INTERVAL_MINUTES, DEFAULT_START_MINUTE,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const KEY_START_MIN: &str = "start_minutes";
const KEY_END_MIN: &str = "end_minutes";
const KEY_INTERVAL: &str = "interval_minutes";

/// Durable settings storage.
pub trait SettingsStore {
    fn load(&self) -> RepoResult<Settings>;
    fn save(&self, settings: &Settings) -> RepoResult<()>;
}

/// SQLite-backed settings store.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_key(&self, key: &str, default: u32) -> RepoResult<u32> {
        let stored = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match stored {
            None => Ok(default),
            Some(value) => u32::try_from(value).map_err(|_| {
                RepoError::InvalidData(format!("invalid value `{value}` for settings.{key}"))
            }),
        }
    }
}

impl SettingsStore for SqliteSettingsRepository<'_> {
    fn load(&self) -> RepoResult<Settings> {
        let settings = Settings {
            start_minute: self.read_key(KEY_START_MIN, DEFAULT_START_MINUTE)?,
            end_minute: self.read_key(KEY_END_MIN, DEFAULT_END_MINUTE)?,
            interval_minute: self.read_key(KEY_INTERVAL, DEFAULT_INTERVAL_MINUTES)?,
        };
        settings
            .validate()
            .map_err(|err| RepoError::InvalidData(format!("stored settings rejected: {err}")))?;
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> RepoResult<()> {
        settings.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in [
            (KEY_START_MIN, settings.start_minute),
            (KEY_END_MIN, settings.end_minute),
            (KEY_INTERVAL, settings.interval_minute),
        ] {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
                params![key, i64::from(value)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
