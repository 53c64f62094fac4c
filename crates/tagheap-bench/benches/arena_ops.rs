//! Criterion micro-benchmarks for allocate, deallocate, and first-fit scans.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tagheap::Arena;
use tagheap_bench::{fragment, request_sizes};

/// Benchmark: allocate one element and free it on a fresh 4 KiB arena.
fn bench_alloc_free_single(c: &mut Criterion) {
    let mut arena = Arena::<u32, 4096>::new();
    c.bench_function("alloc_free_single", |b| {
        b.iter(|| {
            let p = arena.allocate(black_box(1)).unwrap();
            arena.deallocate(p).unwrap();
        });
    });
}

/// Benchmark: fill a 4 KiB arena with seeded sizes, then drain it.
fn bench_fill_and_drain(c: &mut Criterion) {
    let sizes = request_sizes(512, 8, 42);
    c.bench_function("fill_and_drain_4k", |b| {
        b.iter(|| {
            let mut arena = Arena::<u32, 4096>::new();
            let mut handles = Vec::with_capacity(sizes.len());
            for &n in &sizes {
                match arena.allocate(n) {
                    Ok(p) => handles.push(p),
                    Err(_) => break,
                }
            }
            for p in handles.drain(..).rev() {
                arena.deallocate(p).unwrap();
            }
            black_box(arena.diagnostics().tag_at(0));
        });
    });
}

/// Benchmark: first-fit scan across a fragmented arena for a request
/// only the tail can satisfy.
fn bench_first_fit_fragmented(c: &mut Criterion) {
    let mut arena = Arena::<u32, 16384>::new();
    let _live = fragment(&mut arena, 7);
    let largest = arena.diagnostics().stats().unwrap().largest_free_payload;
    let n = (largest / 4).max(1);
    c.bench_function("first_fit_fragmented_16k", |b| {
        b.iter(|| {
            if let Ok(p) = arena.allocate(black_box(n)) {
                arena.deallocate(p).unwrap();
            }
        });
    });
}

/// Benchmark: free the middle of three blocks between two free ones.
fn bench_three_way_merge(c: &mut Criterion) {
    c.bench_function("three_way_merge", |b| {
        b.iter(|| {
            let mut arena = Arena::<u32, 36>::new();
            let p = arena.allocate(1).unwrap();
            let q = arena.allocate(1).unwrap();
            let r = arena.allocate(1).unwrap();
            arena.deallocate(p).unwrap();
            arena.deallocate(r).unwrap();
            arena.deallocate(q).unwrap();
            black_box(arena.diagnostics().tag_at(0));
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_single,
    bench_fill_and_drain,
    bench_first_fit_fragmented,
    bench_three_way_merge
);
criterion_main!(benches);
