use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use purgekit::policy::purge_lru::PurgeLruCache;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1000;

fn filled(purge_ratio: f64) -> PurgeLruCache<u64, u64> {
    let mut cache = PurgeLruCache::new(CAPACITY, purge_ratio);
    for i in 0..CAPACITY as u64 {
        cache.put(i, i);
    }
    cache
}

fn bench_put_get_hit(c: &mut Criterion) {
    c.bench_function("purge_lru_get_hit", |b| {
        b.iter_batched(
            || filled(0.25),
            |mut cache| {
                for i in 0..CAPACITY as u64 {
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

// Same churn under different batch sizes: one-in-one-out vs. block purges.
fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("purge_lru_eviction_churn");
    for ratio in [0.001, 0.1, 0.25, 0.5, 1.0] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, &ratio| {
            b.iter_batched(
                || filled(ratio),
                |mut cache| {
                    for i in 0..4 * CAPACITY as u64 {
                        cache.put(std::hint::black_box(10_000 + i), i);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_random_mix(c: &mut Criterion) {
    c.bench_function("purge_lru_random_mix", |b| {
        b.iter_batched(
            || (filled(0.25), SmallRng::seed_from_u64(42)),
            |(mut cache, mut rng)| {
                for _ in 0..4 * CAPACITY {
                    let key = rng.random::<u64>() % (2 * CAPACITY as u64);
                    if cache.get(&key).is_none() {
                        cache.put(key, key);
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_put_get_hit,
    bench_eviction_churn,
    bench_random_mix
);
criterion_main!(benches);
