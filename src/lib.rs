//! A single-value TTL cache persisted to a file
//!
//! [`TtlFileCache`] holds one value produced by a caller-supplied [`Producer`],
//! writes it to disk, and serves it until it is older than the expiry interval.
//! The `cli` module backs the `ttlcache` binary and is exposed for integration tests.

pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod producer;

pub use cache::{
    CacheBuilder, CacheRecord, CorruptPolicy, Lookup, LookupSource, SharedTtlFileCache,
    TtlFileCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use producer::Producer;
