//! Benchmark for jar registry resolution.
//!
//! Run with: cargo bench --package jarkeeper_economy --bench registry_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jarkeeper_economy::{ConsumeAction, ItemCatalog, JarContentRegistry, JarContentsConfig};
use std::sync::Arc;

fn create_catalog() -> Arc<ItemCatalog> {
    let mut catalog = ItemCatalog::new();
    catalog.register("drinkJarEmpty", 10, None).unwrap();

    // 500 consumables, every other one a jar content
    for i in 0..500u32 {
        let action = if i % 2 == 0 {
            ConsumeAction::jar_refund("drinkJarEmpty")
        } else {
            ConsumeAction::plain()
        };
        catalog.register(format!("consumable_{i}"), 10, Some(action)).unwrap();
    }

    Arc::new(catalog)
}

fn benchmark_cold_resolution(c: &mut Criterion) {
    let catalog = create_catalog();

    c.bench_function("resolve_500_cold", |b| {
        b.iter(|| {
            let registry = JarContentRegistry::new(&JarContentsConfig::default(), catalog.clone());
            for i in 0..500u32 {
                black_box(registry.resolve_container(&format!("consumable_{i}")));
            }
        });
    });
}

fn benchmark_memoized_resolution(c: &mut Criterion) {
    let registry = JarContentRegistry::new(&JarContentsConfig::default(), create_catalog());
    let names: Vec<String> = (0..500u32).map(|i| format!("consumable_{i}")).collect();
    for name in &names {
        let _ = registry.resolve_container(name);
    }

    c.bench_function("resolve_500_memoized", |b| {
        b.iter(|| {
            for name in &names {
                black_box(registry.resolve_container(name));
            }
        });
    });
}

criterion_group!(benches, benchmark_cold_resolution, benchmark_memoized_resolution);
criterion_main!(benches);
