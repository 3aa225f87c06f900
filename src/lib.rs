//! purgekit: bounded LRU cache with amortized batch eviction.
//!
//! [`PurgeLruCache`](policy::purge_lru::PurgeLruCache) keeps entries in
//! recency order on an arena-backed intrusive list and, when full, evicts a
//! fixed fraction of its capacity from the least recently used end in one
//! pass.
//!
//! ```
//! use purgekit::prelude::*;
//!
//! let mut cache = PurgeLruCache::new(8, 0.5);
//! for i in 0..10 {
//!     cache.put(i, i * 10);
//! }
//! assert_eq!(cache.len(), 6);
//! assert_eq!(cache.get(&0), None);
//! assert_eq!(cache.get(&5), Some(&50));
//! ```

pub mod config;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;
