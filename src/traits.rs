//! Capability traits.
//!
//! Traits that describe what a purgekit cache can do, so request-handling
//! code can be written against capabilities instead of a concrete type.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────────────────┐
//!                    │            CoreCache<K, V>              │
//!                    │                                         │
//!                    │  put(&mut, K, V)                        │
//!                    │  get(&mut, &K) → Option<&V>             │
//!                    │  contains(&, &K) → bool                 │
//!                    │  len(&) → usize                         │
//!                    │  is_empty(&) → bool                     │
//!                    │  capacity(&) → usize                    │
//!                    │  clear(&mut)                            │
//!                    └──────────────────┬──────────────────────┘
//!                                       │
//!            ┌──────────────────────────┴──────────────────────────┐
//!            │                                                     │
//!            ▼                                                     ▼
//!   ┌────────────────────────────┐                  ┌─────────────────────────────┐
//!   │   MutableCache<K, V>       │                  │  BatchEvictingCache<K, V>   │
//!   │                            │                  │                             │
//!   │  remove(&K) → Option<V>    │                  │  purge_ratio() → f64        │
//!   │  remove_batch(&[K])        │                  │  batch_size() → usize       │
//!   └─────────────┬──────────────┘                  │  purge() → PurgeOutcome     │
//!                 │                                 └─────────────────────────────┘
//!                 ▼
//!   ┌────────────────────────────┐
//!   │   LruCacheTrait<K, V>      │
//!   │                            │
//!   │  pop_lru() → (K, V)        │
//!   │  peek_lru() → (&K, &V)     │
//!   │  touch(&K) → bool          │
//!   │  recency_rank(&K) → usize  │
//!   └────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! Implementations are single-owner: every mutating operation (including
//! `get`, which promotes) takes `&mut self`. Share a cache between threads by
//! wrapping it in a mutex, or use `ConcurrentPurgeLruCache` with the
//! `concurrency` feature.

use crate::policy::purge_lru::PurgeOutcome;

/// Bounded key/value storage with a single eviction policy.
///
/// # Example
///
/// ```
/// use purgekit::traits::CoreCache;
/// use purgekit::policy::purge_lru::PurgeLruCache;
///
/// fn answer_or_compute<C: CoreCache<String, String>>(cache: &mut C, prompt: &str) -> String {
///     if let Some(answer) = cache.get(&prompt.to_string()) {
///         return answer.clone();
///     }
///     let answer = prompt.to_uppercase();
///     cache.put(prompt.to_string(), answer.clone());
///     answer
/// }
///
/// let mut cache = PurgeLruCache::new(16, 0.25);
/// assert_eq!(answer_or_compute(&mut cache, "hi"), "HI");
/// assert_eq!(answer_or_compute(&mut cache, "hi"), "HI");
/// assert_eq!(CoreCache::len(&cache), 1);
/// ```
pub trait CoreCache<K, V> {
    /// Stores `value` under `key`, evicting first if the policy demands it.
    fn put(&mut self, key: K, value: V);

    /// Looks `key` up. A hit counts as a use and may reorder entries;
    /// [`contains`](Self::contains) does not.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Membership test that leaves eviction order alone.
    fn contains(&self, key: &K) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound on [`len`](Self::len).
    fn capacity(&self) -> usize;

    /// Drops every entry.
    fn clear(&mut self);
}

/// Caches whose entries can be invalidated by key.
///
/// # Example
///
/// ```
/// use purgekit::traits::{CoreCache, MutableCache};
/// use purgekit::policy::purge_lru::PurgeLruCache;
///
/// let mut cache = PurgeLruCache::new(8, 0.5);
/// cache.put("weather", "sunny");
/// cache.put("news", "quiet");
///
/// let dropped = MutableCache::remove_batch(&mut cache, &["weather", "sports"]);
/// assert_eq!(dropped, vec![Some("sunny"), None]);
/// assert!(cache.contains(&"news"));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Evicts `key`, returning its value if it was resident.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Evicts each key in turn; results line up with `keys`.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// LRU-specific operations that respect recency order.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Evicts the single oldest entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Oldest entry, left in place.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Counts a use of `key` without reading it. `false` on a miss.
    fn touch(&mut self, key: &K) -> bool;

    /// Position of `key` in recency order, 0 being the newest.
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Caches that evict a block of entries at once when they run out of room.
///
/// # Example
///
/// ```
/// use purgekit::traits::{BatchEvictingCache, CoreCache};
/// use purgekit::policy::purge_lru::PurgeLruCache;
///
/// fn headroom<C: BatchEvictingCache<u32, u32>>(cache: &C) -> usize {
///     cache.capacity() - cache.batch_size()
/// }
///
/// let cache: PurgeLruCache<u32, u32> = PurgeLruCache::new(8, 0.5);
/// assert_eq!(headroom(&cache), 4);
/// ```
pub trait BatchEvictingCache<K, V>: CoreCache<K, V> {
    /// Fraction of capacity evicted per purge, in `(0, 1]`.
    fn purge_ratio(&self) -> f64;

    /// Number of entries a purge of a full cache removes.
    fn batch_size(&self) -> usize;

    /// Evicts up to [`batch_size`](Self::batch_size) least recently used
    /// entries now, regardless of vacancy.
    fn purge(&mut self) -> PurgeOutcome;
}
