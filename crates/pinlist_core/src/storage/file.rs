//! Directory-backed key-value storage, one file per key.
//!
//! # Invariants
//! - Values are written to a sibling temp file and renamed into place, so a
//!   reader never observes a half-written value.
//! - Temp file names end with `~`, which `validate_key` never accepts, so they
//!   cannot shadow a real key.

use super::{validate_key, KeyValueStorage, StorageResult};
use log::debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-per-key storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        match fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.root)?;

        let target = self.entry_path(key);
        let temp = self.root.join(format!("{key}.tmp~"));
        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &target)?;
        debug!(
            "event=kv_write module=storage backend=file status=ok bytes={}",
            value.len()
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
