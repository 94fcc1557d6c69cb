//! Criterion benches for the SPSC ring queue.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use streetlob::{ring, Command, NewOrder, Side};

fn bench_push_pop_cycle(c: &mut Criterion) {
    let (mut tx, mut rx) = ring::<u64, 1024>();

    c.bench_function("push_pop_cycle", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            tx.push(black_box(i)).expect("queue has room");
            black_box(rx.pop()).expect("queue has an element");
        })
    });
}

fn bench_command_traffic(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_traffic");
    group.throughput(Throughput::Elements(512));

    let (mut tx, mut rx) = ring::<Command, 1024>();
    let cmd = Command::New(NewOrder::day(1, 1, Side::Buy, 10_000, 5));

    group.bench_function("burst_512", |b| {
        b.iter(|| {
            for _ in 0..512 {
                tx.push(black_box(cmd)).expect("queue has room");
            }
            while let Some(popped) = rx.pop() {
                black_box(popped);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_push_pop_cycle, bench_command_traffic);
criterion_main!(benches);
