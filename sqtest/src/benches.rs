use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slotq::SlotQueue;

const ITEMS: usize = 32 * 1024;
const QUEUE_SLOTS: usize = 64;

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("slotq 64 spsc", |bench| {
        bench.iter(|| {
            let q = SlotQueue::with_capacity(QUEUE_SLOTS).unwrap();
            crossbeam::thread::scope(|sc| {
                sc.spawn(|_| {
                    for i in 0..ITEMS {
                        q.push(i).unwrap();
                    }
                });
                sc.spawn(|_| {
                    for _ in 0..ITEMS {
                        black_box(q.pop().unwrap());
                    }
                });
            })
            .unwrap();
        })
    });

    c.bench_function("slotq 64 mpmc 2x2", |bench| {
        bench.iter(|| {
            let q = SlotQueue::with_capacity(QUEUE_SLOTS).unwrap();
            crossbeam::thread::scope(|sc| {
                for _ in 0..2 {
                    sc.spawn(|_| {
                        for i in 0..ITEMS / 2 {
                            q.push(i).unwrap();
                        }
                    });
                    sc.spawn(|_| {
                        for _ in 0..ITEMS / 2 {
                            black_box(q.pop().unwrap());
                        }
                    });
                }
            })
            .unwrap();
        })
    });

    c.bench_function("std sync_channel 64", |bench| {
        bench.iter(|| {
            let (tx, rx) = std::sync::mpsc::sync_channel::<usize>(QUEUE_SLOTS);
            crossbeam::thread::scope(|sc| {
                sc.spawn(move |_| {
                    for i in 0..ITEMS {
                        tx.send(i).unwrap();
                    }
                });
                sc.spawn(move |_| {
                    for _ in 0..ITEMS {
                        black_box(rx.recv().unwrap());
                    }
                });
            })
            .unwrap();
        })
    });

    c.bench_function("xbeam bounded 64", |bench| {
        bench.iter(|| {
            let (tx, rx) = crossbeam::channel::bounded::<usize>(QUEUE_SLOTS);
            crossbeam::thread::scope(|sc| {
                sc.spawn(move |_| {
                    for i in 0..ITEMS {
                        tx.send(i).unwrap();
                    }
                });
                sc.spawn(move |_| {
                    for _ in 0..ITEMS {
                        black_box(rx.recv().unwrap());
                    }
                });
            })
            .unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
