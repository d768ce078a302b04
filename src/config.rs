//! Cache configuration
//!
//! [`CacheConfig`] is the serde-friendly form of the cache settings, suitable for
//! embedding in an application's own config file. It is validated when handed to
//! [`CacheBuilder::config`](crate::CacheBuilder::config).

use std::path::PathBuf;

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cache::CorruptPolicy;
use crate::error::CacheError;

/// File name used inside the platform cache directory
const CACHE_FILE_NAME: &str = "cache.json";

/// Fallback location when no platform cache directory is available
const FALLBACK_STORAGE_PATH: &str = "simple-cache/cache";

/// Settings for a [`TtlFileCache`](crate::TtlFileCache)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a value stays fresh; 0 refreshes on every read
    pub expiry_seconds: i64,
    /// Where the record is stored; `None` picks the platform cache directory
    pub storage_path: Option<PathBuf>,
    /// What to do with an unreadable cache file
    pub on_corrupt: CorruptPolicy,
}

impl CacheConfig {
    /// Expiry used when none is configured
    pub const DEFAULT_EXPIRY_SECONDS: i64 = 30;

    /// Validates and converts the expiry interval
    pub fn expiry(&self) -> Result<Duration, CacheError> {
        if self.expiry_seconds < 0 {
            return Err(CacheError::Configuration(format!(
                "expiry interval must not be negative, got {}s",
                self.expiry_seconds
            )));
        }
        Duration::try_seconds(self.expiry_seconds).ok_or_else(|| {
            CacheError::Configuration(format!(
                "expiry interval {}s is too large",
                self.expiry_seconds
            ))
        })
    }

    /// Returns the configured storage path, or the default one
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(default_storage_path)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: Self::DEFAULT_EXPIRY_SECONDS,
            storage_path: None,
            on_corrupt: CorruptPolicy::default(),
        }
    }
}

/// Default cache file location
///
/// Uses `~/.cache/ttlcache/cache.json` on Linux, or the equivalent platform
/// path elsewhere. Falls back to `simple-cache/cache` relative to the working
/// directory when no home directory can be determined.
pub fn default_storage_path() -> PathBuf {
    ProjectDirs::from("", "", "ttlcache")
        .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STORAGE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.expiry_seconds, 30);
        assert!(config.storage_path.is_none());
        assert_eq!(config.on_corrupt, CorruptPolicy::Fail);
        assert_eq!(config.expiry().unwrap(), Duration::seconds(30));
    }

    #[test]
    fn test_negative_expiry_is_configuration_error() {
        let config = CacheConfig {
            expiry_seconds: -5,
            ..Default::default()
        };
        let err = config.expiry().unwrap_err();
        assert!(matches!(err, CacheError::Configuration(_)));
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_zero_expiry_is_allowed() {
        let config = CacheConfig {
            expiry_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.expiry().unwrap(), Duration::zero());
    }

    #[test]
    fn test_explicit_storage_path_wins() {
        let config = CacheConfig {
            storage_path: Some(PathBuf::from("/var/cache/app/value.json")),
            ..Default::default()
        };
        assert_eq!(
            config.resolved_storage_path(),
            PathBuf::from("/var/cache/app/value.json")
        );
    }

    #[test]
    fn test_default_storage_path_names_the_project() {
        let path = default_storage_path();
        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("ttlcache") || path == PathBuf::from(FALLBACK_STORAGE_PATH),
            "Unexpected default path: {}",
            path_str
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"expiry_seconds": 120, "on_corrupt": "refresh"}"#).unwrap();
        assert_eq!(config.expiry_seconds, 120);
        assert_eq!(config.on_corrupt, CorruptPolicy::Refresh);
        assert!(config.storage_path.is_none());
    }
}
