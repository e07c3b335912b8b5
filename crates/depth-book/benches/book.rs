//! Benchmarks for book store operations
//!
//! Run with: cargo bench --bench book

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use depth_book::BookStore;
use depth_types::{BookFrame, RawLevel};

/// Levels stepping away from `base` by `step`
fn create_levels(base: i64, count: usize, step: i64) -> Vec<RawLevel> {
    (0..count as i64)
        .map(|i| RawLevel::new((base + step * i).to_string(), format!("{}.{}", 1 + i % 7, i % 10)))
        .collect()
}

fn create_store(depth: usize) -> BookStore {
    let mut store = BookStore::new();
    store.apply_frame(&BookFrame::snapshot(
        create_levels(100_000, depth, -1),
        create_levels(100_001, depth, 1),
    ));
    store
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_snapshot");

    for size in [50, 200, 400] {
        let frame = BookFrame::snapshot(
            create_levels(100_000, size, -1),
            create_levels(100_001, size, 1),
        );
        group.throughput(Throughput::Elements(size as u64 * 2));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| {
                let mut store = BookStore::new();
                store.apply_frame(black_box(frame));
                black_box(store)
            })
        });
    }

    group.finish();
}

fn bench_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_delta");

    for size in [50, 200, 400] {
        let delta = BookFrame::delta(
            vec![
                RawLevel::new("100000", "2.5"),
                RawLevel::new("99990", "0"),
            ],
            vec![RawLevel::new("100005", "0.75")],
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || create_store(size),
                |mut store| {
                    store.apply_frame(black_box(&delta));
                    black_box(store)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");

    for size in [50, 400] {
        let store = create_store(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| black_box(store.materialize_default()))
        });
    }

    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let store = create_store(400);
    c.bench_function("okx_checksum", |b| b.iter(|| black_box(store.okx_checksum())));
}

criterion_group!(benches, bench_snapshot, bench_delta, bench_materialize, bench_checksum);
criterion_main!(benches);
