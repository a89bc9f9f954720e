//! Benchmark suite for indexed access under each cache policy.
//!
//! Run with: `cargo bench`
//!
//! This benchmark measures:
//! - Fast-path hits (borrow flag, bounds check, buffer read)
//! - Sequential forward scans under none / memo / sliding window
//! - Sliding-window shift cost against the index delta
//! - Random access with and without memoization
//! - Lazy combinator pipelines

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sequence_engine::{sources, CachePolicy, Sequence};

/// A generator with a small but non-trivial per-element cost.
fn workload() -> Sequence<u64> {
    sources::tabulate(|i| {
        let mut x = i as u64 ^ 0x5DEE_CE66;
        for _ in 0..8 {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        }
        x
    })
}

/// Deterministic pseudo-random indices below `bound`.
fn scattered_indices(count: usize, bound: usize) -> Vec<usize> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % bound as u64) as usize
        })
        .collect()
}

/// Benchmark cache hits.
fn bench_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("fast_path");

    for policy in [CachePolicy::memo(), CachePolicy::window(1024)] {
        let seq = workload().with_cache(policy).unwrap();
        seq.get(1023).unwrap();

        group.throughput(Throughput::Elements(1024));
        group.bench_function(policy.name(), |b| {
            b.iter(|| {
                for i in 0..1024 {
                    black_box(seq.get(black_box(i)).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark a forward scan through `get`.
fn bench_sequential_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_scan");

    for len in [256usize, 2048].iter() {
        let policies = [
            CachePolicy::None,
            CachePolicy::memo(),
            CachePolicy::window(64),
        ];
        for policy in policies {
            group.throughput(Throughput::Elements(*len as u64));
            group.bench_with_input(BenchmarkId::new(policy.name(), len), len, |b, &len| {
                b.iter(|| {
                    let seq = workload().with_cache(policy).unwrap();
                    for i in 0..len {
                        black_box(seq.get(i).unwrap());
                    }
                });
            });
        }
    }

    group.finish();
}

/// Benchmark one forward window shift of `delta` elements far from the start.
///
/// Time should grow with `delta`, not with the absolute index.
fn bench_window_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_shift");

    for delta in [1usize, 16, 256].iter() {
        group.throughput(Throughput::Elements(*delta as u64));
        group.bench_with_input(BenchmarkId::new("delta", delta), delta, |b, &delta| {
            let seq = workload().with_cache(CachePolicy::window(32)).unwrap();
            let mut index = 100_000;
            seq.get(index).unwrap();
            b.iter(|| {
                index += delta;
                black_box(seq.get(index).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark scattered reads.
fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_access");
    let indices = scattered_indices(512, 4096);

    group.throughput(Throughput::Elements(indices.len() as u64));
    group.bench_function("memo_warm", |b| {
        let seq = workload().memoize();
        seq.get(4095).unwrap();
        b.iter(|| {
            for &i in &indices {
                black_box(seq.get(i).unwrap());
            }
        });
    });

    group.bench_function("memo_cold", |b| {
        b.iter(|| {
            let seq = workload().memoize();
            for &i in &indices {
                black_box(seq.get(i).unwrap());
            }
        });
    });

    group.bench_function("window_128", |b| {
        b.iter(|| {
            let seq = workload().with_cache(CachePolicy::window(128)).unwrap();
            for &i in &indices[..32] {
                black_box(seq.get(i).unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark a lazy combinator chain consumed by a strict operation.
fn bench_combinators(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinators");

    for n in [1_000usize, 100_000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::new("map_filter_sum", n), n, |b, &n| {
            b.iter(|| {
                let total = sources::naturals()
                    .map(|x| x * x)
                    .filter(|x| x % 3 == 1)
                    .take(n)
                    .sum()
                    .unwrap();
                black_box(total)
            });
        });

        group.bench_with_input(BenchmarkId::new("zip_count", n), n, |b, &n| {
            let a = sources::naturals();
            let z = sources::integers_from(0);
            b.iter(|| {
                black_box(a.zip(&z, |x, y| x as i64 + y).take(n).count().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fast_path,
    bench_sequential_scan,
    bench_window_shift,
    bench_random_access,
    bench_combinators,
);

criterion_main!(benches);
