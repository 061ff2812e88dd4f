//! Performance benchmarks for observer dispatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ricecoder_observers::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct FileEvent {
    size: u64,
}

#[derive(Debug)]
struct FileSaved {
    file: FileEvent,
}

impl_event!(FileEvent);
impl_event!(FileSaved: FileEvent => file);

/// Simple observer for benchmarking
#[derive(Default)]
struct ByteCounter {
    bytes: AtomicU64,
}

impl ByteCounter {
    fn on_file(&self, event: &FileEvent) -> HandlerResult {
        self.bytes.fetch_add(event.size, Ordering::Relaxed);
        Ok(())
    }

    fn after_saved(&self, _: AfterEvent<'_, FileSaved>) -> HandlerResult {
        Ok(())
    }
}

impl Observer for ByteCounter {
    fn observe(registrar: &mut Registrar<Self>) {
        registrar.on(Self::on_file).after(Self::after_saved);
    }
}

fn manager_with(observers: usize) -> ObserverManager {
    let manager = ObserverManager::new();
    for _ in 0..observers {
        manager
            .add_observer(Arc::new(ByteCounter::default()))
            .unwrap();
    }
    manager
}

fn benchmark_cached_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_dispatch");

    for observers in [1usize, 10, 100] {
        let manager = manager_with(observers);
        // Warm the cache
        manager.fire(Arc::new(FileSaved {
            file: FileEvent { size: 1 },
        }));

        group.bench_with_input(
            BenchmarkId::from_parameter(observers),
            &manager,
            |b, manager| {
                b.iter(|| {
                    let event = Arc::new(FileSaved {
                        file: FileEvent { size: black_box(512) },
                    });
                    black_box(manager.fire(event))
                })
            },
        );
    }

    group.finish();
}

fn benchmark_cache_rebuild(c: &mut Criterion) {
    let manager = manager_with(50);
    let extra = Arc::new(ByteCounter::default());

    c.bench_function("fire_after_membership_change", |b| {
        b.iter(|| {
            manager.add_observer(extra.clone()).unwrap();
            manager.fire(Arc::new(FileSaved {
                file: FileEvent { size: 1 },
            }));
            black_box(manager.remove_observer(&extra))
        })
    });
}

fn benchmark_registration(c: &mut Criterion) {
    c.bench_function("add_observer", |b| {
        b.iter(|| {
            let manager = ObserverManager::new();
            black_box(manager.add_observer(Arc::new(ByteCounter::default())))
        })
    });
}

criterion_group!(
    benches,
    benchmark_cached_dispatch,
    benchmark_cache_rebuild,
    benchmark_registration
);
criterion_main!(benches);
