use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use flume::unbounded as flume_unbounded;
use spsc_pool::{channel, Orchestrator, PoolConfig};
use std::sync::mpsc::channel as std_channel;

const MESSAGES: usize = 1_000_000;

fn bench_1p_1c(c: &mut Criterion) {
    let mut group = c.benchmark_group("1p_1c");
    group.throughput(Throughput::Elements(MESSAGES as u64));

    group.bench_function("spsc_pool", |b| {
        b.iter(|| {
            let (mut tx, mut rx) = channel::<usize>();

            let producer = thread::spawn(move || {
                for i in 0..MESSAGES {
                    tx.push(black_box(i));
                }
            });

            let consumer = thread::spawn(move || {
                for _ in 0..MESSAGES {
                    while rx.pop().is_err() {
                        std::hint::spin_loop();
                    }
                }
            });

            producer.join().unwrap();
            consumer.join().unwrap();
        });
    });

    group.bench_function("crossbeam_channel", |b| {
        b.iter(|| {
            let (tx, rx) = unbounded::<usize>();

            let producer = thread::spawn(move || {
                for i in 0..MESSAGES {
                    tx.send(black_box(i)).unwrap();
                }
            });

            let consumer = thread::spawn(move || {
                for _ in 0..MESSAGES {
                    rx.recv().unwrap();
                }
            });

            producer.join().unwrap();
            consumer.join().unwrap();
        });
    });

    group.bench_function("flume", |b| {
        b.iter(|| {
            let (tx, rx) = flume_unbounded::<usize>();

            let producer = thread::spawn(move || {
                for i in 0..MESSAGES {
                    tx.send(black_box(i)).unwrap();
                }
            });

            let consumer = thread::spawn(move || {
                for _ in 0..MESSAGES {
                    rx.recv().unwrap();
                }
            });

            producer.join().unwrap();
            consumer.join().unwrap();
        });
    });

    group.bench_function("std_mpsc", |b| {
        b.iter(|| {
            let (tx, rx) = std_channel::<usize>();

            let producer = thread::spawn(move || {
                for i in 0..MESSAGES {
                    tx.send(black_box(i)).unwrap();
                }
            });

            let consumer = thread::spawn(move || {
                for _ in 0..MESSAGES {
                    rx.recv().unwrap();
                }
            });

            producer.join().unwrap();
            consumer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_single_thread_ping_pong(c: &mut Criterion) {
    let mut group = c.benchmark_group("ping_pong");
    group.throughput(Throughput::Elements(MESSAGES as u64));

    group.bench_function("spsc_pool", |b| {
        let (mut tx, mut rx) = channel::<usize>();
        b.iter(|| {
            for i in 0..MESSAGES {
                tx.push(black_box(i));
                black_box(rx.pop().ok());
            }
        });
    });

    group.finish();
}

fn bench_pool_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_rounds");
    group.sample_size(10);

    for workers in [1usize, 2, 4] {
        let config = PoolConfig::builder()
            .workers(workers)
            .rounds(8)
            .delay(Duration::ZERO)
            .settle(Duration::ZERO)
            .poll_interval(Duration::from_micros(50))
            .build();
        group.throughput(Throughput::Elements(config.total_items(1024)));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &config, |b, config| {
            b.iter(|| {
                Orchestrator::<1024>::run(config.clone()).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_1p_1c, bench_single_thread_ping_pong, bench_pool_rounds);
criterion_main!(benches);
