//! Benchmarks for predicate evaluation.
//!
//! Each benchmark builds its cache once outside the measured loop and then
//! times `QueryEngine::evaluate` alone.

use cinder_index::{Comparison, StoreKind, TypeDefinition};
use cinder_query::ast::{Functor, Generator, Parameters};
use cinder_query::predicate::{
    AggregatePredicate, CompareFunctorValuePredicate, LogicalPredicate, Predicate, TagPredicate,
};
use cinder_query::{CachedObject, InMemoryCache};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

struct Person {
    name: String,
    age: i32,
}

/// Simple LCG for reproducible pseudo-random ages
fn ages(count: usize, seed: u64) -> Vec<i32> {
    let mut s = seed;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((s >> 33) % 100) as i32
        })
        .collect()
}

fn create_cache(count: usize) -> InMemoryCache {
    let cache = InMemoryCache::default();
    cache.register_type(
        TypeDefinition::builder::<Person>("Person")
            .attribute("age", StoreKind::Ordered, |p| Some(p.age.into()))
            .attribute("name", StoreKind::Hash, |p| Some(p.name.as_str().into()))
            .build(),
    );
    for (i, age) in ages(count, 12345).into_iter().enumerate() {
        let mut object = CachedObject::new(
            "Person",
            Person {
                name: format!("name_{}", i),
                age,
            },
        );
        if i % 10 == 0 {
            object = object.with_tags(["vip"]);
        }
        cache.insert(format!("k{}", i), object).ok();
    }
    cache
}

fn age(comparison: Comparison, value: i32) -> CompareFunctorValuePredicate {
    CompareFunctorValuePredicate::new(Functor::member("age"), comparison, Generator::constant(value))
}

fn bench_tree(c: &mut Criterion, group: &str, tree: &dyn Predicate) {
    let mut group = c.benchmark_group(group);
    let params = Parameters::new();

    for size in [1000usize, 10000].iter() {
        let cache = create_cache(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let engine = cache.query_engine();
            b.iter(|| black_box(engine.evaluate(tree, &params, "Person").ok()));
        });
    }

    group.finish();
}

fn range_benchmark(c: &mut Criterion) {
    bench_tree(c, "range", &age(Comparison::GreaterThan, 50));
}

fn like_benchmark(c: &mut Criterion) {
    let like = CompareFunctorValuePredicate::like(Functor::member("name"), Generator::constant("name_1%"));
    bench_tree(c, "like", &like);
}

fn logical_benchmark(c: &mut Criterion) {
    let and = LogicalPredicate::and(vec![
        Box::new(age(Comparison::GreaterThan, 25)) as Box<dyn Predicate>,
        Box::new(TagPredicate::any(["vip"])),
    ]);
    bench_tree(c, "and_tag", &and);

    let or = LogicalPredicate::or(vec![
        Box::new(age(Comparison::LessThan, 10)) as Box<dyn Predicate>,
        Box::new(age(Comparison::GreaterThan, 90)),
    ]);
    bench_tree(c, "or_range", &or);
}

fn aggregate_benchmark(c: &mut Criterion) {
    let sum = AggregatePredicate::sum("age", age(Comparison::GreaterThanEquals, 0));
    bench_tree(c, "sum", &sum);
}

criterion_group!(
    benches,
    range_benchmark,
    like_benchmark,
    logical_benchmark,
    aggregate_benchmark
);
criterion_main!(benches);
