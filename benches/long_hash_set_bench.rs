use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use long_hash_set::LongHashSet;
use std::collections::HashSet;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("long::insert_fresh_100k", |b| {
        b.iter_batched(
            LongHashSet::<u64>::new,
            |mut s| {
                for x in lcg(1).take(100_000) {
                    s.insert(x);
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("std::insert_fresh_100k", |b| {
        b.iter_batched(
            HashSet::<u64>::new,
            |mut s| {
                for x in lcg(1).take(100_000) {
                    s.insert(x);
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

// Pre-grown then emptied by removal: inserts reuse freed arena slots and
// never rehash.
fn bench_insert_warm_100k(c: &mut Criterion) {
    c.bench_function("long::insert_warm_100k", |b| {
        b.iter_batched(
            || {
                let mut s = LongHashSet::new();
                let xs: Vec<u64> = lcg(2).take(110_000).collect();
                for &x in &xs {
                    s.insert(x);
                }
                s.remove_all(&xs);
                s
            },
            |mut s| {
                for x in lcg(3).take(100_000) {
                    s.insert(x);
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_contains_hit(c: &mut Criterion) {
    let xs: Vec<u64> = lcg(7).take(20_000).collect();
    let long: LongHashSet<u64> = xs.iter().copied().collect();
    let baseline: HashSet<u64> = xs.iter().copied().collect();

    c.bench_function("long::contains_hit", |b| {
        let mut it = xs.iter().cycle();
        b.iter(|| black_box(long.contains(it.next().unwrap())))
    });
    c.bench_function("std::contains_hit", |b| {
        let mut it = xs.iter().cycle();
        b.iter(|| black_box(baseline.contains(it.next().unwrap())))
    });
}

fn bench_contains_miss(c: &mut Criterion) {
    let long: LongHashSet<u64> = lcg(11).take(10_000).collect();
    c.bench_function("long::contains_miss", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| black_box(long.contains(&miss.next().unwrap())))
    });
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("long::remove_insert_churn_10k", |b| {
        let xs: Vec<u64> = lcg(13).take(10_000).collect();
        let mut s: LongHashSet<u64> = xs.iter().copied().collect();
        let mut it = xs.iter().cycle();
        b.iter(|| {
            let x = it.next().unwrap();
            s.remove(x);
            black_box(s.insert(*x));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_warm_100k, bench_contains_hit,
        bench_contains_miss, bench_churn
}
criterion_main!(benches);
