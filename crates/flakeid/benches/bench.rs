use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeid::{
    AtomicSnowflakeGenerator, CUSTOM_EPOCH, GeneratorConfig, LockSnowflakeGenerator, Poll,
    SnowflakeGenerator, SystemClock, TimeSource,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fixed_time() -> FixedMockTime {
    FixedMockTime {
        millis: CUSTOM_EPOCH.as_millis() as u64 + 1,
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded). Matches one millisecond of sequence space.
const TOTAL_IDS: usize = 4096;

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G, T>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: SnowflakeGenerator<T>,
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id() {
                        Ok(Poll::Ready { id }) => {
                            black_box(id);
                        }
                        Ok(Poll::Pending { .. }) | Err(_) => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks generators on the real wall clock, spinning through sequence
/// exhaustion.
fn bench_generator_spin<G>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) where
    G: SnowflakeGenerator<SystemClock>,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = generator_factory();
            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().expect("clock moved backwards"));
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one shared generator hammered from several threads.
fn bench_generator_threaded<G>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) where
    G: SnowflakeGenerator<SystemClock> + Send + Sync,
{
    let threads = num_cpus::get().clamp(2, 8);
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let generator = generator_factory();
            let barrier = Arc::new(Barrier::new(threads + 1));

            scope(|s| {
                for _ in 0..threads {
                    let barrier = Arc::clone(&barrier);
                    let generator = &generator;
                    s.spawn(move || {
                        barrier.wait();
                        for _ in 0..iters {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.next_id().expect("clock moved backwards"));
                            }
                        }
                    });
                }

                barrier.wait();
                let start = Instant::now();
                // Joining the scope waits for every worker.
                start
            })
            .elapsed()
        });
    });

    group.finish();
}

fn benchmark_mock_lock(c: &mut Criterion) {
    bench_generator(c, "mock/lock", || {
        LockSnowflakeGenerator::new(GeneratorConfig::new(0), fixed_time()).expect("valid config")
    });
}

fn benchmark_mock_atomic(c: &mut Criterion) {
    bench_generator(c, "mock/atomic", || {
        AtomicSnowflakeGenerator::new(GeneratorConfig::new(0), fixed_time()).expect("valid config")
    });
}

fn benchmark_system_lock(c: &mut Criterion) {
    bench_generator_spin(c, "system/lock", || {
        LockSnowflakeGenerator::new(GeneratorConfig::new(0), SystemClock).expect("valid config")
    });
}

fn benchmark_system_atomic(c: &mut Criterion) {
    bench_generator_spin(c, "system/atomic", || {
        AtomicSnowflakeGenerator::new(GeneratorConfig::new(0), SystemClock).expect("valid config")
    });
}

fn benchmark_threaded_lock(c: &mut Criterion) {
    bench_generator_threaded(c, "threaded/lock", || {
        LockSnowflakeGenerator::new(GeneratorConfig::new(0), SystemClock).expect("valid config")
    });
}

fn benchmark_threaded_atomic(c: &mut Criterion) {
    bench_generator_threaded(c, "threaded/atomic", || {
        AtomicSnowflakeGenerator::new(GeneratorConfig::new(0), SystemClock).expect("valid config")
    });
}

criterion_group!(
    benches,
    benchmark_mock_lock,
    benchmark_mock_atomic,
    benchmark_system_lock,
    benchmark_system_atomic,
    benchmark_threaded_lock,
    benchmark_threaded_atomic,
);
criterion_main!(benches);
