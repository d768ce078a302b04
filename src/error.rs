//! Error types for the TTL file cache
//!
//! Every fallible operation in the crate returns [`CacheError`]. The variants
//! mirror the ways a cache lifecycle can go wrong: the producer fails, the
//! stored record cannot be read back, the new record cannot be written, or
//! the cache was configured with values it cannot honour.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::DecodeError;

/// Boxed error returned by producers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while loading, refreshing or persisting a cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The producer could not supply a fresh value
    #[error("Producer failed: {0}")]
    Producer(#[source] BoxError),

    /// The cache file exists but could not be read
    #[error("Cache file {} could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file does not contain a valid record
    #[error("Cache file {} is not a valid record: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// Writing the record (or creating its directory) failed
    #[error("Failed to persist cache file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache was configured with invalid settings
    #[error("Invalid cache configuration: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Wraps a producer failure
    pub fn producer<E: Into<BoxError>>(err: E) -> Self {
        Self::Producer(err.into())
    }

    /// Returns true for errors raised while reading back an existing file
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::Decode { .. })
    }
}
