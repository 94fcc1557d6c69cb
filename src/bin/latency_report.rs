//! Single-threaded matching latency percentiles.
//!
//! Drives `on_command` directly (no queues, no threads) over a
//! pre-generated command buffer and reports an HDR histogram.

use std::time::Instant;

use hdrhistogram::Histogram;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use streetlob::{ring, Command, MatchingEngine, NewOrder, Side};

const CAP: usize = 1 << 16;
const ITERATIONS: usize = 1_000_000;
const BUFFER_SIZE: usize = 10_000;

fn main() {
    println!("Preparing latency benchmark...");

    let (exec_tx, mut exec_rx) = ring();
    let (md_tx, mut md_rx) = ring();
    let mut engine: MatchingEngine<CAP> = MatchingEngine::new(exec_tx, md_tx);

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000, 3).expect("valid bounds");

    // Pre-generate commands so RNG stays out of the measured section.
    // Alternate non-crossing bids and asks, with periodic crossers for a
    // realistic mix of rests and fills.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut commands = Vec::with_capacity(BUFFER_SIZE);
    for i in 0..BUFFER_SIZE as u64 {
        let crosser = i % 16 == 0;
        let side = if rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let price = match (side, crosser) {
            (Side::Buy, false) => rng.gen_range(9_900..9_950),
            (Side::Sell, false) => rng.gen_range(10_050..10_100),
            (Side::Buy, true) => 10_100,
            (Side::Sell, true) => 9_900,
        };
        commands.push(Command::New(NewOrder::day(i + 1, 1, side, price, 10)));
    }

    println!("Warming up ({BUFFER_SIZE} ops)...");
    for cmd in &commands {
        let shifted = shift_ids(cmd, BUFFER_SIZE as u64);
        std::hint::black_box(engine.on_command(&shifted)).expect("warm-up commands are valid");
        drain(&mut exec_rx, &mut md_rx);
    }

    println!("Running {ITERATIONS} iterations...");
    let mut total = std::time::Duration::ZERO;
    for round in 0..(ITERATIONS / BUFFER_SIZE) as u64 {
        for cmd in &commands {
            // Fresh ids each pass so resting orders never collide.
            let shifted = shift_ids(cmd, (round + 2) * BUFFER_SIZE as u64);

            let start = Instant::now();
            std::hint::black_box(engine.on_command(&shifted)).expect("commands are valid");
            let elapsed = start.elapsed();

            histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
            total += elapsed;
            drain(&mut exec_rx, &mut md_rx);
        }
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total ops:  {ITERATIONS}");
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / total.as_secs_f64()
    );
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:6} ns", histogram.max());
}

fn shift_ids(cmd: &Command, offset: u64) -> Command {
    match cmd {
        Command::New(n) => {
            let mut n = *n;
            n.order_id += offset;
            Command::New(n)
        }
        Command::Cancel(c) => Command::Cancel(*c),
    }
}

fn drain(
    exec_rx: &mut streetlob::Consumer<streetlob::ExecEvent, CAP>,
    md_rx: &mut streetlob::Consumer<streetlob::MarketDataEvent, CAP>,
) {
    while exec_rx.pop().is_some() {}
    while md_rx.pop().is_some() {}
}
