//! Thread-safe handle to a [`TtlFileCache`]
//!
//! The expiry check and the refresh run under one lock, so threads sharing a
//! handle trigger at most one refresh per expiry. Separate processes pointed at
//! the same file are not coordinated.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

use super::ttl::TtlFileCache;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::producer::Producer;

/// Cloneable, lock-protected cache handle
pub struct SharedTtlFileCache<P: Producer, C = SystemClock> {
    inner: Arc<Mutex<TtlFileCache<P, C>>>,
}

impl<P: Producer, C> Clone for SharedTtlFileCache<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Producer, C> From<TtlFileCache<P, C>> for SharedTtlFileCache<P, C> {
    fn from(cache: TtlFileCache<P, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }
}

impl<P, C> SharedTtlFileCache<P, C>
where
    P: Producer,
    P::Value: Serialize + DeserializeOwned + Clone,
    C: Clock,
{
    /// Returns a copy of the cached value, refreshing it first if expired
    pub fn get_data(&self) -> Result<P::Value> {
        self.inner.lock().get_data().cloned()
    }

    /// Refreshes regardless of expiry and returns a copy of the new value
    pub fn refresh(&self) -> Result<P::Value> {
        self.inner.lock().refresh().cloned()
    }

    /// Runs `f` with exclusive access to the underlying cache
    pub fn with<R>(&self, f: impl FnOnce(&mut TtlFileCache<P, C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
