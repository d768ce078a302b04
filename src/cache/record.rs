//! The persisted unit of the cache: a value and when it was produced

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while decoding a stored record
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Content is not JSON, is truncated, or does not match the payload type
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The file was written by an incompatible format version
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// A cached value together with the time it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    /// When the value was produced, in whole seconds
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// The cached payload
    pub value: T,
}

/// Wrapper struct for a record as stored on disk
#[derive(Serialize)]
struct StoredRecord<'a, T> {
    version: u32,
    #[serde(flatten)]
    record: &'a CacheRecord<T>,
}

#[derive(Deserialize)]
struct StoredHeader {
    version: u32,
}

#[derive(Deserialize)]
struct StoredBody<T> {
    #[serde(flatten)]
    record: CacheRecord<T>,
}

impl<T> CacheRecord<T> {
    /// Creates a record stamped at `produced_at`
    ///
    /// The time is rounded up to the next whole second so the in-memory
    /// timestamp matches what the file stores and never makes the value look
    /// older than it is.
    pub fn new(value: T, produced_at: DateTime<Utc>) -> Self {
        let whole = produced_at.trunc_subsecs(0);
        let timestamp = if whole < produced_at {
            whole + Duration::seconds(1)
        } else {
            whole
        };
        Self { timestamp, value }
    }
}

impl<T: Serialize> CacheRecord<T> {
    /// Serializes the record into its on-disk form
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(&StoredRecord {
            version: FORMAT_VERSION,
            record: self,
        })
    }
}

impl<T: DeserializeOwned> CacheRecord<T> {
    /// Parses a record previously written by [`CacheRecord::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header: StoredHeader = serde_json::from_slice(bytes)?;
        if header.version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: header.version,
                expected: FORMAT_VERSION,
            });
        }
        let body: StoredBody<T> = serde_json::from_slice(bytes)?;
        Ok(body.record)
    }
}
