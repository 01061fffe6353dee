//! Key-value byte storage backends.
//!
//! # Responsibility
//! - Define the local-storage seam used by the list persistence adapter.
//! - Provide in-memory, file-per-key and SQLite implementations.
//!
//! # Invariants
//! - Keys are validated by `validate_key` in every backend before any I/O.
//! - `set` replaces the full value for a key; there are no partial writes.
//! - `get` on an unknown key is `Ok(None)`, never an error.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

static STORAGE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,128}$").expect("valid storage key regex"));

pub type StorageResult<T> = Result<T, StorageError>;

/// Error for key-value storage reads and writes.
#[derive(Debug)]
pub enum StorageError {
    /// Key is empty, too long, or contains unsupported characters.
    InvalidKey(String),
    /// Write would exceed the configured byte quota.
    QuotaExceeded { requested: usize, quota: usize },
    /// Backing table is missing from the opened database.
    MissingRequiredTable(&'static str),
    Io(std::io::Error),
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::QuotaExceeded { requested, quota } => write!(
                f,
                "storage quota exceeded: {requested} bytes requested, quota is {quota} bytes"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::QuotaExceeded { .. } | Self::MissingRequiredTable(_) => {
                None
            }
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Byte store keyed by string, modelled on browser local storage.
pub trait KeyValueStorage {
    /// Reads the full value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    /// Replaces the full value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;
    /// Removes `key`. Removing an unknown key succeeds.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// Validates one storage key.
///
/// Accepts 1..=128 chars of `[A-Za-z0-9._-]`, excluding `.` and `..` so a key
/// can always be used as a plain file name.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key == "." || key == ".." || !STORAGE_KEY_RE.is_match(key) {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
