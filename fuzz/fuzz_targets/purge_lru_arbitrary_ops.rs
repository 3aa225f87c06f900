#![no_main]

use libfuzzer_sys::fuzz_target;
use purgekit::policy::purge_lru::{MAX_CAPACITY, PurgeLruCache};

// Fuzz arbitrary get/put/remove/purge sequences on PurgeLruCache.
//
// First two bytes pick capacity and purge ratio; the rest are (op, key) pairs.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = 1 + (usize::from(data[0]) % (MAX_CAPACITY - 1));
    let purge_ratio = (f64::from(data[1]) + 1.0) / 256.0;
    let mut cache: PurgeLruCache<u8, u16> = PurgeLruCache::new(capacity, purge_ratio);

    for pair in data[2..].chunks_exact(2) {
        let key = pair[1];
        match pair[0] % 5 {
            0 | 1 => {
                let was_full = !cache.has_vacancy();
                let before = cache.len();
                cache.put(key, u16::from(key) * 2);
                assert!(cache.len() <= capacity);
                if !was_full && !cache.contains(&key) {
                    panic!("key missing after put without purge");
                }
                if !was_full {
                    assert!(cache.len() == before || cache.len() == before + 1);
                }
                assert_eq!(cache.keys().next(), Some(&key));
            }
            2 => {
                let len = cache.len();
                if let Some(value) = cache.get(&key) {
                    assert_eq!(*value, u16::from(key) * 2);
                    assert_eq!(cache.recency_rank(&key), Some(0));
                }
                assert_eq!(cache.len(), len);
            }
            3 => {
                cache.remove(&key);
                assert!(!cache.contains(&key));
            }
            _ => {
                let outcome = cache.purge();
                assert!(outcome.evicted() <= cache.batch_size());
            }
        }
    }

    cache.check_invariants().unwrap();
});
