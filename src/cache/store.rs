//! File storage for a single cache record
//!
//! Provides a `RecordStore` that reads and writes one [`CacheRecord`] at a fixed
//! path. Writes go to a temporary file in the same directory which is then
//! renamed over the destination, so a reader sees either the old record or the
//! new one and never a partial file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::record::CacheRecord;
use crate::error::{CacheError, Result};

/// Reads and writes the cache file
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Location of the cache file
    path: PathBuf,
}

impl RecordStore {
    /// Creates a store for the cache file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the cache file lives in (`.` for a bare file name)
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir())
    }

    /// Reads the record from disk
    ///
    /// # Returns
    /// * `Ok(None)` if no cache file exists
    /// * `Ok(Some(record))` if the file holds a valid record
    /// * `Err(CacheError::Unreadable)` if the file exists but cannot be read
    /// * `Err(CacheError::Decode)` if the content is not a valid record
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<CacheRecord<T>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Unreadable {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record = CacheRecord::decode(&bytes).map_err(|source| CacheError::Decode {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), timestamp = %record.timestamp, "loaded cache record");
        Ok(Some(record))
    }

    /// Writes the record to disk, replacing any previous one
    ///
    /// Missing parent directories are created first.
    pub fn save<T: Serialize>(&self, record: &CacheRecord<T>) -> Result<()> {
        self.write_atomic(record).map_err(|source| CacheError::Persistence {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic<T: Serialize>(&self, record: &CacheRecord<T>) -> io::Result<()> {
        let encoded = record
            .encode()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.ensure_dir()?;

        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), bytes = encoded.len(), "wrote cache record");
        Ok(())
    }
}
