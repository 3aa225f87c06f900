//! # LRU Cache with Batch (Purge-Ratio) Eviction
//!
//! A bounded key→value cache that keeps entries in recency order and, when it
//! runs out of room, evicts a whole block of least-recently-used entries in
//! one pass instead of one entry per overflow.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        PurgeLruCache<K, V>                           │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId>   (non-owning handles)                 │   │
//!   │   │                                                              │   │
//!   │   │   "k7" ──────────────┐                                       │   │
//!   │   │   "k5" ────────┐     │                                       │   │
//!   │   │   "k6" ──┐     │     │                                       │   │
//!   │   └──────────┼─────┼─────┼───────────────────────────────────────┘   │
//!   │              ▼     ▼     ▼                                           │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<Entry<K, V>>  (owns key + value)              │   │
//!   │   │                                                              │   │
//!   │   │  head ──► [k7] ◄──► [k5] ◄──► [k6] ◄── tail                  │   │
//!   │   │           MRU                  LRU                           │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Batch Eviction
//!
//! ```text
//!   capacity = 8, purge_ratio = 0.5  →  batch_size = 4
//!
//!   put(k8) with 8 resident:
//!     head ──► [k7][k6][k5][k4][k3][k2][k1][k0] ◄── tail
//!     1. purge: pop k0, k1, k2, k3 from the tail
//!     2. push k8 at the head
//!     head ──► [k8][k7][k6][k5][k4] ◄── tail      (5 resident)
//! ```
//!
//! Occupancy oscillates between `capacity` and `capacity - batch_size`, so
//! the cost of an eviction pass is spread over `batch_size` later inserts.
//!
//! The batch size is `ceil(capacity * purge_ratio)`. A product that is within
//! `1e-9` of a whole number is taken as that whole number, so
//! `10 * 0.3` evicts 3 rather than 4.
//!
//! ## Operations
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `try_new`        | O(1)       | Validated construction                    |
//! | `put(k, v)`      | O(1)*      | Insert or update + promote; may purge     |
//! | `get(&k)`        | O(1)       | Lookup + promote to MRU                   |
//! | `peek(&k)`       | O(1)       | Lookup without promotion                  |
//! | `remove(&k)`     | O(1)       | Remove a single entry                     |
//! | `pop_lru()`      | O(1)       | Remove the least recently used entry      |
//! | `purge()`        | O(batch)   | Evict one batch now                       |
//! | `recency_rank()` | O(n)       | Position in recency order (0 = MRU)       |
//!
//! `*` amortized: a purge costs O(batch_size) and happens once every
//! `batch_size` inserts at most.
//!
//! ## Thread Safety
//!
//! `PurgeLruCache` is single-owner. `get` promotes and therefore needs
//! `&mut self`. With the `concurrency` feature, [`ConcurrentPurgeLruCache`]
//! serializes access through one `parking_lot::Mutex` per cache.
//!
//! ## Example
//!
//! ```
//! use purgekit::policy::purge_lru::PurgeLruCache;
//!
//! let mut cache = PurgeLruCache::new(8, 0.5);
//! for i in 0..10 {
//!     cache.put(format!("k{i}"), i);
//! }
//! assert_eq!(cache.len(), 6);
//! assert_eq!(cache.get(&"k0".to_string()), None);
//! assert_eq!(cache.get(&"k5".to_string()), Some(&5));
//! ```

use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::time::Duration;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::config::CacheConfig;
use crate::ds::{IntrusiveList, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::traits::{BatchEvictingCache, CoreCache, LruCacheTrait, MutableCache};

/// Exclusive upper bound on `capacity`. A sanity check against
/// misconfiguration, not a performance limit.
pub const MAX_CAPACITY: usize = 1024;

/// Purge ratio used by [`PurgeLruCache::with_capacity`].
pub const DEFAULT_PURGE_RATIO: f64 = 0.25;

const BATCH_ROUNDING_TOLERANCE: f64 = 1e-9;

/// Checks construction parameters without building anything.
pub(crate) fn validate_params(capacity: usize, purge_ratio: f64) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::new("cache capacity must be greater than zero"));
    }
    if capacity >= MAX_CAPACITY {
        return Err(ConfigError::new(format!(
            "cache capacity must be below {MAX_CAPACITY}, got {capacity}"
        )));
    }
    if !purge_ratio.is_finite() || purge_ratio <= 0.0 || purge_ratio > 1.0 {
        return Err(ConfigError::new(format!(
            "purge_ratio must be in (0.0, 1.0], got {purge_ratio}"
        )));
    }
    Ok(())
}

fn batch_size_for(capacity: usize, purge_ratio: f64) -> usize {
    let exact = capacity as f64 * purge_ratio;
    let nearest = exact.round();
    let rounded = if (exact - nearest).abs() < BATCH_ROUNDING_TOLERANCE {
        nearest
    } else {
        exact.ceil()
    };
    (rounded as usize).clamp(1, capacity)
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Sizes of the cache before and after a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub before: usize,
    pub after: usize,
}

impl PurgeOutcome {
    /// Number of entries the purge removed.
    pub fn evicted(&self) -> usize {
        self.before - self.after
    }
}

/// Bounded LRU cache with purge-ratio batch eviction.
///
/// # Example
///
/// ```
/// use purgekit::policy::purge_lru::PurgeLruCache;
///
/// let mut cache = PurgeLruCache::new(4, 0.5);
/// cache.put(1, "one");
/// cache.put(2, "two");
/// cache.put(1, "uno"); // update, not a second entry
///
/// assert_eq!(cache.len(), 2);
/// assert_eq!(cache.get(&1), Some(&"uno"));
/// ```
#[derive(Debug)]
pub struct PurgeLruCache<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    purge_ratio: f64,
    batch_size: usize,
}

impl<K, V> PurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero or not below
    /// [`MAX_CAPACITY`], or if `purge_ratio` is not a finite number in
    /// `(0.0, 1.0]`.
    pub fn try_new(capacity: usize, purge_ratio: f64) -> Result<Self, ConfigError> {
        validate_params(capacity, purge_ratio)?;
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
            capacity,
            purge_ratio,
            batch_size: batch_size_for(capacity, purge_ratio),
        })
    }

    /// Creates a cache.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize, purge_ratio: f64) -> Self {
        match Self::try_new(capacity, purge_ratio) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache with [`DEFAULT_PURGE_RATIO`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is invalid.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, DEFAULT_PURGE_RATIO)
    }

    /// Creates a cache from a loaded [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        Self::try_new(config.capacity, config.purge_ratio)
    }

    /// Returns the number of resident entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of resident entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fraction of capacity evicted per purge.
    #[inline]
    pub fn purge_ratio(&self) -> f64 {
        self.purge_ratio
    }

    /// Number of entries one purge of a full cache removes.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `true` while another new key fits without a purge.
    #[inline]
    pub fn has_vacancy(&self) -> bool {
        self.len() < self.capacity
    }

    /// Returns `true` if `key` is resident. Does not promote.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up `key` and promotes it to most recently used.
    ///
    /// Returns `None` for keys never inserted or already evicted; a miss
    /// changes nothing. Never evicts.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.index.is_empty() {
            return None;
        }
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Looks up `key` without changing recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Inserts `value` under `key`, or replaces the value of a resident key.
    ///
    /// When the cache is full, one batch of least recently used entries is
    /// purged first. Either way the key ends up most recently used, and an
    /// update never grows the entry count.
    pub fn put(&mut self, key: K, value: V) {
        if !self.has_vacancy() {
            self.purge();
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_front(id);
        } else {
            let id = self.list.push_front(Entry {
                key: key.clone(),
                value,
            });
            self.index.insert(key, id);
        }

        debug_assert_eq!(self.index.len(), self.list.len());
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|entry| entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Returns the least recently used entry without promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Promotes `key` without reading it. Returns `false` on a miss.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Position of `key` in recency order (0 = most recently used).
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        if !self.index.contains_key(key) {
            return None;
        }
        self.list.iter().position(|entry| entry.key == *key)
    }

    /// Evicts up to [`batch_size`](Self::batch_size) least recently used
    /// entries, stopping early if the cache empties.
    pub fn purge(&mut self) -> PurgeOutcome {
        let before = self.len();
        let mut remaining = self.batch_size;
        while remaining > 0 && self.pop_lru().is_some() {
            remaining -= 1;
        }
        let outcome = PurgeOutcome {
            before,
            after: self.len(),
        };
        debug!(
            before = outcome.before,
            after = outcome.after,
            batch = self.batch_size,
            "purged least recently used entries"
        );
        outcome
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|entry| &entry.key)
    }

    /// Verifies that the index and the recency list describe the same set of
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] naming the first broken invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.len(),
                self.capacity
            )));
        }

        let mut handles = FxHashSet::default();
        for (key, &id) in &self.index {
            if !handles.insert(id) {
                return Err(InvariantError::new("two keys share one list node"));
            }
            match self.list.get(id) {
                None => {
                    return Err(InvariantError::new(
                        "index handle points at a node missing from the recency list",
                    ));
                },
                Some(entry) if entry.key != *key => {
                    return Err(InvariantError::new(
                        "index handle resolves to a node holding a different key",
                    ));
                },
                Some(_) => {},
            }
        }

        let reachable = self.list.iter_ids().count();
        if reachable != self.list.len() {
            return Err(InvariantError::new(format!(
                "{reachable} nodes reachable from head, list length is {}",
                self.list.len()
            )));
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for PurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn put(&mut self, key: K, value: V) {
        PurgeLruCache::put(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        PurgeLruCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        PurgeLruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        PurgeLruCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        PurgeLruCache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for PurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        PurgeLruCache::remove(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for PurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        PurgeLruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        PurgeLruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        PurgeLruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        PurgeLruCache::recency_rank(self, key)
    }
}

impl<K, V> BatchEvictingCache<K, V> for PurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn purge_ratio(&self) -> f64 {
        self.purge_ratio
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn purge(&mut self) -> PurgeOutcome {
        PurgeLruCache::purge(self)
    }
}

/// Thread-safe [`PurgeLruCache`] guarded by a single `parking_lot::Mutex`.
///
/// `get` promotes, so every operation takes the exclusive lock. Values are
/// cloned out; use [`get_with`](Self::get_with) to borrow instead.
///
/// # Example
///
/// ```
/// use purgekit::policy::purge_lru::ConcurrentPurgeLruCache;
/// use std::sync::Arc;
/// use std::thread;
///
/// let cache = Arc::new(ConcurrentPurgeLruCache::new(64, 0.25));
/// let writer = {
///     let cache = Arc::clone(&cache);
///     thread::spawn(move || cache.put("prompt", "answer".to_string()))
/// };
/// writer.join().unwrap();
/// assert_eq!(cache.get(&"prompt"), Some("answer".to_string()));
/// ```
#[cfg(feature = "concurrency")]
#[derive(Debug)]
pub struct ConcurrentPurgeLruCache<K, V> {
    inner: Mutex<PurgeLruCache<K, V>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentPurgeLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a concurrent cache, returning an error on invalid parameters.
    pub fn try_new(capacity: usize, purge_ratio: f64) -> Result<Self, ConfigError> {
        PurgeLruCache::try_new(capacity, purge_ratio).map(Self::from_cache)
    }

    /// Creates a concurrent cache.
    ///
    /// # Panics
    ///
    /// Panics if parameters are invalid.
    pub fn new(capacity: usize, purge_ratio: f64) -> Self {
        Self::from_cache(PurgeLruCache::new(capacity, purge_ratio))
    }

    /// Creates a concurrent cache from a loaded [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        PurgeLruCache::from_config(config).map(Self::from_cache)
    }

    /// Wraps an existing cache.
    pub fn from_cache(cache: PurgeLruCache<K, V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Looks up and promotes `key`, cloning the value out.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.inner.lock();
        cache.get(key).cloned()
    }

    /// Looks up and promotes `key`, running `f` on the value under the lock.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    /// Like [`get`](Self::get), but gives up if the lock is not acquired
    /// within `timeout`. The outer `None` means the lock timed out.
    pub fn try_get_for(&self, key: &K, timeout: Duration) -> Option<Option<V>>
    where
        V: Clone,
    {
        let mut cache = self.inner.try_lock_for(timeout)?;
        Some(cache.get(key).cloned())
    }

    /// Inserts or updates `key`.
    pub fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock();
        cache.put(key, value);
    }

    /// Like [`put`](Self::put), but gives up if the lock is not acquired
    /// within `timeout`, handing the pair back.
    pub fn try_put_for(&self, key: K, value: V, timeout: Duration) -> Result<(), (K, V)> {
        match self.inner.try_lock_for(timeout) {
            Some(mut cache) => {
                cache.put(key, value);
                Ok(())
            },
            None => Err((key, value)),
        }
    }

    /// Returns `true` if `key` is resident. Does not promote.
    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.lock();
        cache.contains(key)
    }

    /// Removes `key`, returning its value if it was resident.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock();
        cache.remove(key)
    }

    /// Evicts one batch now.
    pub fn purge(&self) -> PurgeOutcome {
        let mut cache = self.inner.lock();
        cache.purge()
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.lock();
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        let cache = self.inner.lock();
        cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        let cache = self.inner.lock();
        cache.capacity()
    }

    pub fn clear(&self) {
        let mut cache = self.inner.lock();
        cache.clear();
    }

    /// Runs [`PurgeLruCache::check_invariants`] under the lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let cache = self.inner.lock();
        cache.check_invariants()
    }

    /// Unwraps the inner cache.
    pub fn into_inner(self) -> PurgeLruCache<K, V> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of<V>(cache: &PurgeLruCache<String, V>) -> Vec<String> {
        cache.keys().cloned().collect()
    }

    fn k(i: usize) -> String {
        format!("k{i}")
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn accepts_bounds() {
            assert!(PurgeLruCache::<u32, u32>::try_new(1, 1.0).is_ok());
            assert!(PurgeLruCache::<u32, u32>::try_new(MAX_CAPACITY - 1, 0.01).is_ok());
        }

        #[test]
        fn rejects_zero_capacity() {
            let err = PurgeLruCache::<u32, u32>::try_new(0, 0.5).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        fn rejects_capacity_at_ceiling() {
            let err = PurgeLruCache::<u32, u32>::try_new(MAX_CAPACITY, 0.5).unwrap_err();
            assert!(err.message().contains("1024"));
            assert!(PurgeLruCache::<u32, u32>::try_new(MAX_CAPACITY + 1, 0.5).is_err());
        }

        #[test]
        fn rejects_ratio_out_of_range() {
            for ratio in [0.0, -0.25, 1.0001, f64::NAN, f64::INFINITY] {
                let err = PurgeLruCache::<u32, u32>::try_new(8, ratio).unwrap_err();
                assert!(err.message().contains("purge_ratio"), "ratio {ratio}");
            }
        }

        #[test]
        #[should_panic(expected = "purge_ratio")]
        fn new_panics_on_invalid_ratio() {
            let _ = PurgeLruCache::<u32, u32>::new(8, 2.0);
        }

        #[test]
        fn with_capacity_uses_default_ratio() {
            let cache: PurgeLruCache<u32, u32> = PurgeLruCache::with_capacity(20);
            assert_eq!(cache.capacity(), 20);
            assert_eq!(cache.purge_ratio(), DEFAULT_PURGE_RATIO);
            assert_eq!(cache.batch_size(), 5);
            assert!(cache.is_empty());
        }

        #[test]
        fn from_config_round_trips_parameters() {
            let config = CacheConfig {
                capacity: 16,
                purge_ratio: 0.5,
            };
            let cache: PurgeLruCache<u32, u32> = PurgeLruCache::from_config(&config).unwrap();
            assert_eq!(cache.capacity(), 16);
            assert_eq!(cache.batch_size(), 8);
        }
    }

    // ==============================================
    // Batch sizing
    // ==============================================

    #[test]
    fn batch_size_rounds_up_fractional_products() {
        assert_eq!(batch_size_for(8, 0.5), 4);
        assert_eq!(batch_size_for(10, 0.25), 3);
        assert_eq!(batch_size_for(10, 0.3), 3);
        assert_eq!(batch_size_for(3, 0.1), 1);
        assert_eq!(batch_size_for(1, 0.01), 1);
        assert_eq!(batch_size_for(1023, 1.0), 1023);
    }

    // ==============================================
    // get / put
    // ==============================================

    #[test]
    fn get_on_empty_cache_is_absent() {
        let mut cache: PurgeLruCache<String, u32> = PurgeLruCache::new(4, 0.5);
        assert_eq!(cache.get(&k(0)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn absent_key_lookup_has_no_side_effects() {
        let mut cache = PurgeLruCache::new(4, 0.5);
        cache.put(k(1), 1);
        cache.put(k(2), 2);
        let before = keys_of(&cache);

        assert_eq!(cache.get(&k(9)), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(keys_of(&cache), before);
    }

    #[test]
    fn duplicate_put_replaces_without_growing() {
        let mut cache = PurgeLruCache::new(20, 0.25);
        cache.put("aaa".to_string(), "valulu");
        cache.put("aaa".to_string(), "valula");
        cache.put("aaa".to_string(), "valule");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&"aaa".to_string()), Some(&"valule"));
    }

    #[test]
    fn duplicate_put_refreshes_recency() {
        let mut cache = PurgeLruCache::new(4, 0.25);
        cache.put(k(1), 1);
        cache.put(k(2), 2);
        cache.put(k(3), 3);
        cache.put(k(1), 10);

        assert_eq!(keys_of(&cache), vec![k(1), k(3), k(2)]);
        assert_eq!(cache.peek_lru(), Some((&k(2), &2)));
    }

    #[test]
    fn get_promotes_to_most_recently_used() {
        let mut cache = PurgeLruCache::new(3, 0.34);
        cache.put(k(1), 1);
        cache.put(k(2), 2);
        cache.put(k(3), 3);

        assert_eq!(cache.get(&k(1)), Some(&1));
        assert_eq!(cache.recency_rank(&k(1)), Some(0));

        // batch of 2 (ceil(3 * 0.34)) goes: k2 first, then k3
        cache.put(k(4), 4);
        assert!(cache.contains(&k(1)));
        assert!(!cache.contains(&k(2)));
        assert!(!cache.contains(&k(3)));
        assert!(cache.contains(&k(4)));
    }

    #[test]
    fn get_does_not_evict() {
        let mut cache = PurgeLruCache::new(2, 1.0);
        cache.put(1, 'a');
        cache.put(2, 'b');
        for _ in 0..5 {
            assert_eq!(cache.get(&1), Some(&'a'));
            assert_eq!(cache.get(&2), Some(&'b'));
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = PurgeLruCache::new(4, 0.5);
        cache.put(1, "one");
        cache.put(2, "two");
        assert_eq!(cache.peek(&1), Some(&"one"));
        assert_eq!(cache.recency_rank(&1), Some(1));
        assert_eq!(cache.peek(&3), None);
    }

    // ==============================================
    // Batch eviction
    // ==============================================

    #[test]
    fn purge_scenario_from_ten_inserts() {
        let mut cache = PurgeLruCache::new(8, 0.5);
        for i in 0..8 {
            cache.put(k(i), i);
        }
        assert_eq!(cache.len(), 8);
        assert!(!cache.has_vacancy());

        // 9th insert purges k0..k3 first
        cache.put(k(8), 8);
        assert_eq!(cache.len(), 5);
        for i in 0..4 {
            assert!(!cache.contains(&k(i)), "k{i} should be evicted");
        }

        // 10th insert fits without another purge
        cache.put(k(9), 9);
        assert_eq!(cache.len(), 6);
        assert_eq!(keys_of(&cache), vec![k(9), k(8), k(7), k(6), k(5), k(4)]);

        assert_eq!(cache.get(&k(0)), None);
        assert_eq!(cache.get(&k(5)), Some(&5));
        assert_eq!(keys_of(&cache).first(), Some(&k(5)));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn full_ratio_empties_cache_on_overflow() {
        let mut cache = PurgeLruCache::new(4, 1.0);
        for i in 0..4 {
            cache.put(i, i);
        }
        cache.put(99, 99);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek(&99), Some(&99));
    }

    #[test]
    fn fractional_batch_rounds_up() {
        let mut cache = PurgeLruCache::new(10, 0.25);
        for i in 0..11 {
            cache.put(i, i);
        }
        // ceil(2.5) = 3 evicted, then the new key lands
        assert_eq!(cache.len(), 8);
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn update_of_full_cache_purges_first() {
        let mut cache = PurgeLruCache::new(4, 0.5);
        for i in 0..4 {
            cache.put(i, i);
        }
        // key 3 is MRU and survives the purge, then is updated in place
        cache.put(3, 30);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&3), Some(&30));
        assert!(cache.contains(&2));

        // key 0 was in the evicted batch, so this is a fresh insert
        for i in 4..6 {
            cache.put(i, i);
        }
        cache.put(0, 0);
        assert_eq!(cache.len(), 3);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn explicit_purge_reports_sizes() {
        let mut cache = PurgeLruCache::new(8, 0.5);
        for i in 0..3 {
            cache.put(i, i);
        }
        let outcome = cache.purge();
        assert_eq!(outcome, PurgeOutcome { before: 3, after: 0 });
        assert_eq!(outcome.evicted(), 3);

        let outcome = cache.purge();
        assert_eq!(outcome.evicted(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_one_cycles_single_entry() {
        let mut cache = PurgeLruCache::new(1, 0.5);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    // ==============================================
    // Removal and LRU helpers
    // ==============================================

    #[test]
    fn remove_and_pop_lru() {
        let mut cache = PurgeLruCache::new(8, 0.5);
        cache.put(1, "one");
        cache.put(2, "two");
        cache.put(3, "three");

        assert_eq!(cache.remove(&2), Some("two"));
        assert_eq!(cache.remove(&2), None);
        assert_eq!(cache.pop_lru(), Some((1, "one")));
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn evicted_key_is_absent_and_reinsertable() {
        let mut cache = PurgeLruCache::new(2, 0.5);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.remove(&1), None);

        cache.put(1, 100);
        assert_eq!(cache.get(&1), Some(&100));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn touch_and_recency_rank() {
        let mut cache = PurgeLruCache::new(8, 0.5);
        cache.put(1, ());
        cache.put(2, ());
        cache.put(3, ());
        assert_eq!(cache.recency_rank(&1), Some(2));
        assert!(cache.touch(&1));
        assert_eq!(cache.recency_rank(&1), Some(0));
        assert!(!cache.touch(&42));
        assert_eq!(cache.recency_rank(&42), None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut cache = PurgeLruCache::new(4, 0.5);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.peek_lru(), None);
        cache.put(3, 3);
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn trait_objects_see_same_behaviour() {
        fn fill<C: CoreCache<u32, u32>>(cache: &mut C, n: u32) {
            for i in 0..n {
                cache.put(i, i);
            }
        }

        let mut cache = PurgeLruCache::new(8, 0.5);
        fill(&mut cache, 10);
        assert_eq!(CoreCache::len(&cache), 6);
        assert_eq!(BatchEvictingCache::batch_size(&cache), 4);
        assert_eq!(LruCacheTrait::peek_lru(&cache), Some((&4, &4)));
        assert_eq!(
            MutableCache::remove_batch(&mut cache, &[4, 0, 9]),
            vec![Some(4), None, Some(9)]
        );
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn basic_ops() {
            let cache = ConcurrentPurgeLruCache::new(4, 0.5);
            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());
            assert_eq!(cache.get(&1), Some("one".to_string()));
            assert_eq!(cache.get_with(&2, |v| v.len()), Some(3));
            assert!(cache.contains(&2));
            assert_eq!(cache.remove(&2), Some("two".to_string()));
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn timed_ops_succeed_when_uncontended() {
            let cache = ConcurrentPurgeLruCache::new(4, 0.5);
            let timeout = Duration::from_millis(50);
            assert!(cache.try_put_for(1, 10, timeout).is_ok());
            assert_eq!(cache.try_get_for(&1, timeout), Some(Some(10)));
            assert_eq!(cache.try_get_for(&2, timeout), Some(None));
        }

        #[test]
        fn timed_ops_give_up_while_locked() {
            let cache = ConcurrentPurgeLruCache::new(4, 0.5);
            let _guard = cache.inner.lock();
            let timeout = Duration::from_millis(5);
            assert_eq!(cache.try_get_for(&1, timeout), None);
            assert_eq!(cache.try_put_for(1, 10, timeout), Err((1, 10)));
        }

        #[test]
        fn rejects_invalid_parameters() {
            assert!(ConcurrentPurgeLruCache::<u32, u32>::try_new(0, 0.5).is_err());
            let cache = ConcurrentPurgeLruCache::<u32, u32>::try_new(8, 0.5).unwrap();
            assert_eq!(cache.capacity(), 8);
            assert!(cache.into_inner().is_empty());
        }
    }

    // ==============================================
    // Property Tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Put(u32, u32),
            Get(u32),
            Remove(u32),
            Touch(u32),
            Purge,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u32..40, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
                3 => (0u32..40).prop_map(Op::Get),
                1 => (0u32..40).prop_map(Op::Remove),
                1 => (0u32..40).prop_map(Op::Touch),
                1 => Just(Op::Purge),
            ]
        }

        /// Reference model: MRU first.
        struct Model {
            entries: Vec<(u32, u32)>,
            capacity: usize,
            batch: usize,
        }

        impl Model {
            fn promote(&mut self, key: u32) -> Option<u32> {
                let pos = self.entries.iter().position(|(k, _)| *k == key)?;
                let entry = self.entries.remove(pos);
                self.entries.insert(0, entry);
                Some(entry.1)
            }

            fn purge(&mut self) {
                let keep = self.entries.len().saturating_sub(self.batch);
                self.entries.truncate(keep);
            }

            fn put(&mut self, key: u32, value: u32) {
                if self.entries.len() >= self.capacity {
                    self.purge();
                }
                if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
                    self.entries.remove(pos);
                }
                self.entries.insert(0, (key, value));
            }
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_reference_model(
                capacity in 1usize..24,
                ratio in 0.01f64..=1.0,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut cache: PurgeLruCache<u32, u32> = PurgeLruCache::new(capacity, ratio);
                let mut model = Model {
                    entries: Vec::new(),
                    capacity,
                    batch: cache.batch_size(),
                };

                for op in ops {
                    match op {
                        Op::Put(k, v) => {
                            cache.put(k, v);
                            model.put(k, v);
                        },
                        Op::Get(k) => {
                            prop_assert_eq!(cache.get(&k).copied(), model.promote(k));
                        },
                        Op::Remove(k) => {
                            let expected = model
                                .entries
                                .iter()
                                .position(|(mk, _)| *mk == k)
                                .map(|pos| model.entries.remove(pos).1);
                            prop_assert_eq!(cache.remove(&k), expected);
                        },
                        Op::Touch(k) => {
                            prop_assert_eq!(cache.touch(&k), model.promote(k).is_some());
                        },
                        Op::Purge => {
                            cache.purge();
                            model.purge();
                        },
                    }
                    let actual: Vec<(u32, u32)> = cache.iter().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(actual, model.entries.clone());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_len_never_exceeds_capacity(
                capacity in 1usize..64,
                ratio in 0.01f64..=1.0,
                keys in prop::collection::vec(0u32..200, 0..400)
            ) {
                let mut cache = PurgeLruCache::new(capacity, ratio);
                for k in keys {
                    cache.put(k, k);
                    prop_assert!(cache.len() <= capacity);
                    prop_assert!(cache.contains(&k));
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_occupancy_after_purge_is_bounded(
                capacity in 1usize..64,
                ratio in 0.01f64..=1.0,
                extra in 1usize..64
            ) {
                let mut cache = PurgeLruCache::new(capacity, ratio);
                for k in 0..(capacity + extra) {
                    cache.put(k, ());
                }
                prop_assert!(cache.len() >= capacity - cache.batch_size());
                prop_assert!(cache.len() <= capacity);
            }
        }
    }
}
