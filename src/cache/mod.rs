//! Cache module for keeping one value fresh on disk
//!
//! This module provides a single-value cache that persists its record to the
//! filesystem and refreshes it from a producer once it is older than the
//! configured TTL (time-to-live). A fresh process reuses a still-valid file
//! instead of calling the producer again.

mod record;
mod shared;
mod store;
mod ttl;

pub use record::{CacheRecord, DecodeError, FORMAT_VERSION};
pub use shared::SharedTtlFileCache;
pub use store::RecordStore;
pub use ttl::{CacheBuilder, CorruptPolicy, Lookup, LookupSource, TtlFileCache};
