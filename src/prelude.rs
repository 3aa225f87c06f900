pub use crate::config::CacheConfig;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::policy::purge_lru::ConcurrentPurgeLruCache;
pub use crate::policy::purge_lru::{
    DEFAULT_PURGE_RATIO, MAX_CAPACITY, PurgeLruCache, PurgeOutcome,
};
pub use crate::traits::{BatchEvictingCache, CoreCache, LruCacheTrait, MutableCache};
