//! The TTL cache itself
//!
//! A [`TtlFileCache`] holds exactly one [`CacheRecord`] in memory, mirrored to a
//! file. Construction loads the file or seeds it from the producer; afterwards
//! [`TtlFileCache::get_data`] serves the held value until it is older than the
//! expiry interval, then refreshes it from the producer.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::record::CacheRecord;
use super::store::RecordStore;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::producer::Producer;

/// What to do when the existing cache file cannot be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptPolicy {
    /// Fail construction with the load error
    #[default]
    Fail,
    /// Log a warning and treat the file as missing
    Refresh,
}

/// Where a value returned by [`TtlFileCache::lookup`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    /// The held record was still fresh
    Cached,
    /// The producer was called during this lookup
    Refreshed,
}

/// Result of a lookup, including metadata about freshness
#[derive(Debug)]
pub struct Lookup<'a, T> {
    /// The cached or freshly produced value
    pub value: &'a T,
    /// When the value was produced
    pub produced_at: DateTime<Utc>,
    /// Whether the producer ran
    pub source: LookupSource,
}

/// A single-value cache persisted to one file
///
/// The in-memory record is always the last one produced. A failed write is
/// logged and the caller still gets the fresh value, but the record is held as
/// unpersisted and counts as expired, so the next read calls the producer and
/// retries the write.
pub struct TtlFileCache<P: Producer, C = SystemClock> {
    producer: P,
    clock: C,
    expiry: Duration,
    store: RecordStore,
    record: CacheRecord<P::Value>,
    /// Whether `record` matches the file on disk
    persisted: bool,
}

impl<P> TtlFileCache<P>
where
    P: Producer,
    P::Value: Serialize + DeserializeOwned,
{
    /// Creates a cache with the system clock, failing on a corrupt file
    pub fn new(producer: P, expiry: StdDuration, path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().producer(producer).expiry(expiry).path(path).build()
    }

    /// Starts a builder with default settings
    pub fn builder() -> CacheBuilder<P> {
        CacheBuilder::new()
    }
}

impl<P, C> TtlFileCache<P, C>
where
    P: Producer,
    P::Value: Serialize + DeserializeOwned,
    C: Clock,
{
    fn open(
        mut producer: P,
        clock: C,
        expiry: Duration,
        store: RecordStore,
        on_corrupt: CorruptPolicy,
    ) -> Result<Self> {
        let loaded = match store.load::<P::Value>() {
            Ok(loaded) => loaded,
            Err(e) if e.is_load_failure() && on_corrupt == CorruptPolicy::Refresh => {
                warn!(error = %e, "discarding unreadable cache file");
                None
            }
            Err(e) => return Err(e),
        };

        let (record, persisted) = match loaded {
            Some(record) => (record, true),
            None => {
                info!(path = %store.path().display(), "no cache file, seeding from producer");
                produce_and_store(&mut producer, &clock, &store)?
            }
        };

        Ok(Self {
            producer,
            clock,
            expiry,
            store,
            record,
            persisted,
        })
    }

    /// Returns the cached value, refreshing it first if it has expired
    ///
    /// # Errors
    /// * `CacheError::Producer` if a refresh was needed and the producer failed.
    ///   The held record is left untouched.
    pub fn get_data(&mut self) -> Result<&P::Value> {
        Ok(self.lookup()?.value)
    }

    /// Like [`get_data`](Self::get_data), but also reports whether a refresh ran
    pub fn lookup(&mut self) -> Result<Lookup<'_, P::Value>> {
        let source = if self.is_expired() {
            self.refresh_record()?;
            LookupSource::Refreshed
        } else {
            debug!(path = %self.store.path().display(), "cache hit");
            LookupSource::Cached
        };

        Ok(Lookup {
            value: &self.record.value,
            produced_at: self.record.timestamp,
            source,
        })
    }

    /// Refreshes from the producer regardless of expiry
    pub fn refresh(&mut self) -> Result<&P::Value> {
        self.refresh_record()?;
        Ok(&self.record.value)
    }

    /// Whether the held record is stale at the current clock time
    ///
    /// Timestamps are rounded up to the next whole second when produced, so a
    /// record can be served up to one second past its expiry, never before it.
    /// A record stamped more than a second in the future counts as expired, as
    /// does one whose write to disk failed. A zero expiry is always expired.
    pub fn is_expired(&self) -> bool {
        if !self.persisted || self.expiry.is_zero() {
            return true;
        }
        let age = self.clock.now().signed_duration_since(self.record.timestamp);
        age < -Duration::seconds(1) || age >= self.expiry
    }

    fn refresh_record(&mut self) -> Result<()> {
        debug!(path = %self.store.path().display(), "cache expired, refreshing");
        let (record, persisted) = produce_and_store(&mut self.producer, &self.clock, &self.store)?;
        self.record = record;
        self.persisted = persisted;
        Ok(())
    }
}

impl<P: Producer, C> TtlFileCache<P, C> {
    /// The record currently held in memory
    pub fn record(&self) -> &CacheRecord<P::Value> {
        &self.record
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// The configured expiry interval
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Whether the held record was written to disk
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

/// Calls the producer and persists its value
///
/// Producer failures propagate. Persistence failures are logged and the fresh
/// record is returned anyway, flagged as not persisted.
fn produce_and_store<P, C>(
    producer: &mut P,
    clock: &C,
    store: &RecordStore,
) -> Result<(CacheRecord<P::Value>, bool)>
where
    P: Producer,
    P::Value: Serialize,
    C: Clock,
{
    let value = producer.produce().map_err(CacheError::producer)?;
    let record = CacheRecord::new(value, clock.now());

    let persisted = match store.save(&record) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "serving fresh value without persisting it");
            false
        }
    };

    Ok((record, persisted))
}

/// Builder for [`TtlFileCache`]
///
/// Defaults come from [`CacheConfig::default`]: 30 second expiry, the platform
/// cache file, and [`CorruptPolicy::Fail`].
pub struct CacheBuilder<P, C = SystemClock> {
    producer: Option<P>,
    clock: C,
    expiry: std::result::Result<Duration, CacheError>,
    path: Option<PathBuf>,
    on_corrupt: CorruptPolicy,
}

impl<P> CacheBuilder<P> {
    /// Creates a builder with the system clock and default settings
    pub fn new() -> Self {
        Self {
            producer: None,
            clock: SystemClock,
            expiry: Ok(Duration::seconds(CacheConfig::DEFAULT_EXPIRY_SECONDS)),
            path: None,
            on_corrupt: CorruptPolicy::default(),
        }
    }
}

impl<P> Default for CacheBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, C> CacheBuilder<P, C> {
    /// Sets the data source
    pub fn producer(mut self, producer: P) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Sets the expiry interval; zero means every call refreshes
    pub fn expiry(mut self, expiry: StdDuration) -> Self {
        self.expiry = Duration::from_std(expiry)
            .map_err(|_| CacheError::Configuration(format!("expiry interval {expiry:?} is too large")));
        self
    }

    /// Sets the cache file location
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets how a corrupt cache file is handled
    pub fn on_corrupt(mut self, policy: CorruptPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Applies every setting from a config
    pub fn config(mut self, config: &CacheConfig) -> Self {
        self.expiry = config.expiry();
        self.path = Some(config.resolved_storage_path());
        self.on_corrupt = config.on_corrupt;
        self
    }

    /// Replaces the time source
    pub fn clock<C2>(self, clock: C2) -> CacheBuilder<P, C2> {
        CacheBuilder {
            producer: self.producer,
            clock,
            expiry: self.expiry,
            path: self.path,
            on_corrupt: self.on_corrupt,
        }
    }
}

impl<P, C> CacheBuilder<P, C>
where
    P: Producer,
    P::Value: Serialize + DeserializeOwned,
    C: Clock,
{
    /// Loads the cache file or seeds it from the producer
    ///
    /// # Errors
    /// * `CacheError::Configuration` if no producer was set or the expiry is invalid
    /// * `CacheError::Producer` if seeding was needed and the producer failed
    /// * `CacheError::Decode` / `CacheError::Unreadable` for a bad file under
    ///   [`CorruptPolicy::Fail`]
    pub fn build(self) -> Result<TtlFileCache<P, C>> {
        let producer = self
            .producer
            .ok_or_else(|| CacheError::Configuration("no producer configured".to_string()))?;
        let expiry = self.expiry?;
        let path = self
            .path
            .unwrap_or_else(|| CacheConfig::default().resolved_storage_path());

        TtlFileCache::open(producer, self.clock, expiry, RecordStore::new(path), self.on_corrupt)
    }
}
