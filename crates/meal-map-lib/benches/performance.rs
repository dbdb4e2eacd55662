//! Performance benchmarks for meal-map-lib
//!
//! Run with: cargo bench --package meal-map-lib

use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use meal_map_lib::{Coordinate, PlaceRecord, PlaceRegistry, Region, ViewportController};
use tokio::time::Instant;

/// Places scattered around the campus, `duplicates` of every id
fn generate_places(count: usize, duplicates: usize) -> Vec<PlaceRecord> {
    let mut places = Vec::with_capacity(count * duplicates);
    for i in 0..count {
        let t = i as f64 / count.max(1) as f64;
        let location = Coordinate::new(37.55 + t * 0.02, 126.99 + (t * 30.0).sin() * 0.01)
            .expect("generated coordinate in range");
        for _ in 0..duplicates {
            places.push(PlaceRecord {
                id: format!("place-{i}"),
                name: format!("식당 {i}"),
                address: "서울 중구".to_string(),
                rating: Some(4.0),
                location,
            });
        }
    }
    places
}

fn bench_registry_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_add");

    for &count in &[100usize, 1_000, 10_000] {
        let places = generate_places(count, 2);
        group.throughput(Throughput::Elements(places.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &places, |b, places| {
            b.iter(|| {
                let mut registry = PlaceRegistry::new();
                for place in places.iter().cloned() {
                    black_box(registry.add(place));
                }
                registry
            });
        });
    }

    group.finish();
}

fn bench_visible_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_markers");

    let mut registry = PlaceRegistry::new();
    for place in generate_places(10_000, 1) {
        registry.add(place);
    }
    let region = Region::around(Coordinate::new(37.56, 126.99).expect("valid"), 0.008)
        .expect("valid region");

    group.bench_function("within_10k", |b| {
        b.iter(|| black_box(registry.within(black_box(region)).count()));
    });

    group.finish();
}

fn bench_viewport_sampling(c: &mut Criterion) {
    let a = Region::around(Coordinate::new(37.5583, 127.001).expect("valid"), 0.005)
        .expect("valid region");
    let b = Region::around(Coordinate::new(37.5607, 126.9946).expect("valid"), 0.008)
        .expect("valid region");
    let start = Instant::now();
    let mut viewport = ViewportController::new(a);
    viewport.animate_to(b, Duration::from_millis(500));

    c.bench_function("viewport_region_at", |bench| {
        let mut step = 0u64;
        bench.iter(|| {
            step = (step + 1) % 500;
            black_box(viewport.region_at(start + Duration::from_millis(step)))
        });
    });
}

criterion_group!(
    benches,
    bench_registry_add,
    bench_visible_markers,
    bench_viewport_sampling
);
criterion_main!(benches);
