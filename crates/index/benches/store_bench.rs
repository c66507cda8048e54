//! Benchmarks for cinder-index stores using criterion.

use cinder_core::{EntryKey, IndexKey, Value};
use cinder_index::{Comparison, HashStore, IndexStore, OrderedStore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn key(i: i64) -> IndexKey {
    IndexKey::Value(Value::Int64(i))
}

fn populated(store: &mut dyn IndexStore, size: i64) {
    for i in 0..size {
        store.add(key(i % 1000), EntryKey::from(format!("k{}", i)));
    }
}

fn store_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    for size in [100i64, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::new("hash", size), size, |b, &size| {
            b.iter(|| {
                let mut store = HashStore::new();
                populated(&mut store, size);
                black_box(store)
            });
        });
        group.bench_with_input(BenchmarkId::new("ordered", size), size, |b, &size| {
            b.iter(|| {
                let mut store = OrderedStore::new();
                populated(&mut store, size);
                black_box(store)
            });
        });
    }

    group.finish();
}

fn store_lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_lookup");

    for comparison in [Comparison::Equals, Comparison::GreaterThan, Comparison::NotEquals] {
        let mut hash = HashStore::new();
        let mut ordered = OrderedStore::new();
        populated(&mut hash, 10000);
        populated(&mut ordered, 10000);

        group.bench_function(BenchmarkId::new("hash", comparison), |b| {
            b.iter(|| black_box(hash.get_data(&key(900), comparison)));
        });
        group.bench_function(BenchmarkId::new("ordered", comparison), |b| {
            b.iter(|| black_box(ordered.get_data(&key(900), comparison)));
        });
    }

    group.finish();
}

fn store_like_benchmark(c: &mut Criterion) {
    let mut store = HashStore::new();
    for i in 0..5000 {
        let name = if i % 2 == 0 { format!("José {}", i) } else { format!("Mark {}", i) };
        store.add(IndexKey::Value(Value::String(name)), EntryKey::from(format!("k{}", i)));
    }
    let pattern = IndexKey::Value(Value::from("j%"));

    c.bench_function("store_like_5000", |b| {
        b.iter(|| black_box(store.get_data(&pattern, Comparison::Like)));
    });
}

criterion_group!(
    benches,
    store_insert_benchmark,
    store_lookup_benchmark,
    store_like_benchmark
);
criterion_main!(benches);
