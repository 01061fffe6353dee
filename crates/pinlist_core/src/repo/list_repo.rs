//! Todo list persistence adapter.
//!
//! # Responsibility
//! - Serialize the whole `TodoList` to JSON and store it under one key.
//! - Load persisted lists, falling back to an empty list.
//!
//! # Invariants
//! - Every save writes the full list; there are no incremental writes.
//! - `decode_list` always yields unique, non-nil item ids.
//! - Loading never writes.

use crate::model::list::TodoList;
use crate::storage::{validate_key, KeyValueStorage, StorageError};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used when callers do not pick one.
pub const DEFAULT_LIST_KEY: &str = "todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for list persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    /// Persisted bytes are not a valid list document.
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "invalid persisted list data: {err}"),
            Self::Encode(err) => write!(f, "failed to encode list: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for whole-list persistence.
pub trait ListRepository {
    /// Loads the persisted list, or `None` when nothing was stored yet.
    ///
    /// Item ids come back as stored; `TodoListService::open` repairs and
    /// re-persists nil or duplicated ids.
    fn load_list(&self) -> RepoResult<Option<TodoList>>;
    /// Replaces the persisted list.
    fn save_list(&mut self, list: &TodoList) -> RepoResult<()>;
}

/// List repository over any key-value storage backend.
pub struct StorageListRepository<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> StorageListRepository<S> {
    /// Uses `DEFAULT_LIST_KEY`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_LIST_KEY.to_string(),
        }
    }

    /// Uses a caller-provided key, validated up front.
    pub fn with_key(storage: S, key: impl Into<String>) -> RepoResult<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { storage, key })
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

}

impl<S: KeyValueStorage> ListRepository for StorageListRepository<S> {
    fn load_list(&self) -> RepoResult<Option<TodoList>> {
        match self.storage.get(&self.key)? {
            Some(bytes) => decode_document(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save_list(&mut self, list: &TodoList) -> RepoResult<()> {
        let bytes = encode_list(list)?;
        self.storage.set(&self.key, &bytes)?;
        Ok(())
    }
}

/// Encodes a list into its persisted JSON form.
pub fn encode_list(list: &TodoList) -> RepoResult<Vec<u8>> {
    serde_json::to_vec(list).map_err(RepoError::Encode)
}

/// Decodes a persisted JSON list and repairs missing or duplicated ids.
pub fn decode_list(bytes: &[u8]) -> RepoResult<TodoList> {
    let mut list = decode_document(bytes)?;
    let reminted = list.ensure_unique_ids();
    if reminted > 0 {
        warn!("event=list_repair module=repo status=ok reminted_ids={reminted}");
    }
    Ok(list)
}

fn decode_document(bytes: &[u8]) -> RepoResult<TodoList> {
    serde_json::from_slice(bytes).map_err(RepoError::Decode)
}

/// Loads the persisted list, or returns an empty list stamped with `now`.
///
/// Missing data, undecodable data and storage read errors all fall back to
/// an empty list. The cause is logged; nothing is raised.
pub fn load_list_or_empty<R: ListRepository>(repo: &R, now: DateTime<Utc>) -> TodoList {
    match repo.load_list() {
        Ok(Some(list)) => {
            info!(
                "event=list_load module=repo status=ok items={}",
                list.len()
            );
            list
        }
        Ok(None) => {
            info!("event=list_load module=repo status=empty reason=missing");
            TodoList::empty(now)
        }
        Err(err) => {
            error!(
                "event=list_load module=repo status=fallback reason=load_failed error={}",
                err
            );
            TodoList::empty(now)
        }
    }
}
