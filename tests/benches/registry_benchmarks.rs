//! # Registry Benchmarks
//!
//! | Operation | Expectation |
//! |-----------|-------------|
//! | First roamed read (registers) | O(1) append |
//! | Repeated roamed read | flag check, no queue access |
//! | Propagation sweep | O(n) in tracked owners |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use roam_store::InMemorySettingsStore;
use roam_sync::{PropertyOwner, RoamingService};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn service() -> RoamingService {
    RoamingService::new(Arc::new(InMemorySettingsStore::new()))
}

fn tracked_owners(service: &RoamingService, count: usize) -> Vec<PropertyOwner> {
    (0..count)
        .map(|_| {
            let owner = service.owner();
            let _: i32 = owner.get_roamed_property("Bench.Value").unwrap_or_default();
            owner
        })
        .collect()
}

fn bench_roamed_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("roamed-reads");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("first_read_registers", |b| {
        let service = service();
        b.iter_custom(|iters| {
            let owners: Vec<_> = (0..iters).map(|_| service.owner()).collect();
            let start = Instant::now();
            for owner in &owners {
                let value: i32 = owner.get_roamed_property("Bench.Value").unwrap_or_default();
                black_box(value);
            }
            let elapsed = start.elapsed();

            // Clear the registry so iterations don't accumulate entries
            drop(owners);
            service.on_external_store_changed();
            elapsed
        })
    });

    group.bench_function("repeated_read", |b| {
        let service = service();
        let owner = service.owner();
        b.iter(|| {
            let value: i32 = owner.get_roamed_property("Bench.Value").unwrap_or_default();
            black_box(value)
        })
    });

    group.finish();
}

fn bench_propagation_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation-sweep");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 1_000, 10_000] {
        let service = service();
        let owners = tracked_owners(&service, size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("live_owners", size), &size, |b, _| {
            b.iter(|| black_box(service.on_external_store_changed()))
        });

        drop(owners);
    }

    group.finish();
}

criterion_group!(benches, bench_roamed_reads, bench_propagation_sweep);
criterion_main!(benches);
