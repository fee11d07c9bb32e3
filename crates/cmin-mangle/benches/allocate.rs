//! Allocator and tracker benchmarks.

use cmin_mangle::{ScopeTracker, SymbolAllocator};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_allocate(c: &mut Criterion) {
    let alloc = SymbolAllocator::default();

    let mut group = c.benchmark_group("allocator");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("allocate_10k", |b| {
        b.iter(|| {
            let mut index = 0;
            for _ in 0..10_000 {
                let (next, name) = alloc.allocate(black_box(index));
                black_box(name);
                index = next;
            }
        });
    });
    group.finish();
}

fn bench_tracker(c: &mut Criterion) {
    c.bench_function("tracker_nested_blocks", |b| {
        b.iter(|| {
            let mut tracker = ScopeTracker::new(SymbolAllocator::default(), 1_000_000);
            let mut position = 0u32;
            for function in 0..200u32 {
                tracker.register(function * 1_000, position);
                tracker.push_inherited(position + 900);
                for local in 1..50u32 {
                    position += 10;
                    tracker.register(function * 1_000 + local, position);
                }
                position += 500;
            }
            black_box(tracker.registered_count())
        });
    });
}

criterion_group!(benches, bench_allocate, bench_tracker);
criterion_main!(benches);
