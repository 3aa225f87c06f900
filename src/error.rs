//! Error types for the purgekit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (zero or oversized capacity, purge ratio outside `(0, 1]`, unreadable
//!   configuration input).
//! - [`InvariantError`]: Returned by
//!   [`PurgeLruCache::check_invariants`](crate::policy::purge_lru::PurgeLruCache::check_invariants)
//!   when the index and the recency list disagree.
//!
//! ## Example Usage
//!
//! ```
//! use purgekit::error::ConfigError;
//! use purgekit::policy::purge_lru::PurgeLruCache;
//!
//! let cache: Result<PurgeLruCache<String, i32>, ConfigError> =
//!     PurgeLruCache::try_new(100, 0.25);
//! assert!(cache.is_ok());
//!
//! // Invalid ratio is caught without panicking
//! let bad = PurgeLruCache::<String, i32>::try_new(100, 1.5);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Indicates a bug, not a recoverable runtime condition. Carries a
/// human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`PurgeLruCache::try_new`](crate::policy::purge_lru::PurgeLruCache::try_new)
/// and the [`CacheConfig`](crate::config::CacheConfig) loaders. A cache is
/// never constructed from an invalid configuration; nothing is clamped.
///
/// # Example
///
/// ```
/// use purgekit::policy::purge_lru::PurgeLruCache;
///
/// let err = PurgeLruCache::<u64, u64>::try_new(0, 0.5).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

impl From<dotenvy::Error> for ConfigError {
    fn from(err: dotenvy::Error) -> Self {
        Self(format!("failed to read cache configuration: {err}"))
    }
}
