//! Persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the settings store and acknowledgement log store contracts.
//! - Keep SQL details behind those contracts.
//!
//! # Invariants
//! - Settings writes run `Settings::validate()` before persistence.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::settings::SettingsValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod log_repo;
pub mod settings_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by both stores.
#[derive(Debug)]
pub enum RepoError {
    /// Settings rejected at the save boundary.
    InvalidSettings(SettingsValidationError),
    /// Storage transport failure; the store is unavailable.
    Db(DbError),
    /// A persisted row could not be decoded.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSettings(err) => write!(f, "invalid settings: {err}"),
            Self::Db(err) => write!(f, "store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSettings(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<SettingsValidationError> for RepoError {
    fn from(value: SettingsValidationError) -> Self {
        Self::InvalidSettings(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}
