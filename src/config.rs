//! Cache configuration.
//!
//! [`CacheConfig`] carries the two numbers a cache is built from. It can be
//! embedded in a host application's own serde config, or read from a
//! `.env`-style file shared with the rest of the service:
//!
//! ```text
//! # .env
//! HOST=0.0.0.0
//! PORT=7654
//! CACHE_SIZE=64
//! PURGE_RATIO=0.5
//! ```
//!
//! Keys are matched case-insensitively. Keys other than `cache_size` and
//! `purge_ratio` belong to the host application and are skipped.
//!
//! ```
//! use purgekit::config::CacheConfig;
//!
//! let config = CacheConfig::from_dotenv_reader("CACHE_SIZE=64\nPURGE_RATIO=0.5\n".as_bytes())
//!     .unwrap();
//! let cache = config.build::<String, String>().unwrap();
//! assert_eq!(cache.capacity(), 64);
//! assert_eq!(cache.batch_size(), 32);
//! ```

use std::hash::Hash;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::policy::purge_lru::{DEFAULT_PURGE_RATIO, PurgeLruCache, validate_params};

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 8;

/// Parameters for building a [`PurgeLruCache`].
///
/// # Example
///
/// ```
/// use purgekit::config::CacheConfig;
///
/// let config = CacheConfig::default();
/// assert_eq!(config.capacity, 8);
/// assert_eq!(config.purge_ratio, 0.25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of resident entries; must be in `1..1024`.
    #[serde(alias = "cache_size")]
    pub capacity: usize,
    /// Fraction of capacity evicted per purge; must be in `(0, 1]`.
    pub purge_ratio: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            purge_ratio: DEFAULT_PURGE_RATIO,
        }
    }
}

impl CacheConfig {
    /// Reads `KEY=VALUE` lines from `reader`, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed lines, unparsable values, or a
    /// configuration that fails [`validate`](Self::validate).
    pub fn from_dotenv_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for item in dotenvy::from_read_iter(reader) {
            let (key, value) = item?;
            config.assign(&key, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reads a `.env`-style file. See [`from_dotenv_reader`](Self::from_dotenv_reader).
    pub fn from_dotenv_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::default();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            config.assign(&key, &value)?;
        }
        config.validate()?;
        debug!(
            path = %path.display(),
            capacity = config.capacity,
            purge_ratio = config.purge_ratio,
            "loaded cache configuration"
        );
        Ok(config)
    }

    /// Checks the same bounds [`PurgeLruCache::try_new`] enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_params(self.capacity, self.purge_ratio)
    }

    /// Builds an empty cache from this configuration.
    pub fn build<K, V>(&self) -> Result<PurgeLruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        PurgeLruCache::from_config(self)
    }

    fn assign(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "cache_size" | "capacity" => {
                self.capacity = value.parse().map_err(|_| {
                    ConfigError::new(format!("cache_size must be an integer, got {value:?}"))
                })?;
            },
            "purge_ratio" => {
                self.purge_ratio = value.parse().map_err(|_| {
                    ConfigError::new(format!("purge_ratio must be a number, got {value:?}"))
                })?;
            },
            other => debug!(key = other, "ignoring non-cache configuration key"),
        }
        Ok(())
    }
}
