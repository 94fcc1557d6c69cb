//! Engine + street flow only, no strategy. Runs for three seconds and
//! exits. Handy for profiling the matching engine and flow generator in
//! isolation.

use std::thread;
use std::time::Duration;

use streetlob::{
    ring, Command, EngineWorker, ExecEvent, FlowConfig, MarketDataEvent, DEFAULT_QUEUE_CAP,
};
use tracing::info;

const CAP: usize = DEFAULT_QUEUE_CAP;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let (_cmd_tx, cmd_rx) = ring::<Command, CAP>();
    let (exec_tx, mut exec_rx) = ring::<ExecEvent, CAP>();
    let (md_tx, mut md_rx) = ring::<MarketDataEvent, CAP>();

    let mut worker = EngineWorker::new(cmd_rx, exec_tx, md_tx, FlowConfig::default());
    worker.start().expect("fresh worker starts");

    // Drain the outputs so the queues never sit full.
    let mut execs = 0u64;
    let mut prints = 0u64;
    let mut tops = 0u64;
    let deadline = std::time::Instant::now() + Duration::from_secs(3);
    while std::time::Instant::now() < deadline {
        while exec_rx.pop().is_some() {
            execs += 1;
        }
        while let Some(event) = md_rx.pop() {
            match event {
                MarketDataEvent::Trade(_) => prints += 1,
                MarketDataEvent::Top(_) => tops += 1,
            }
        }
        thread::sleep(Duration::from_micros(200));
    }

    worker.stop().expect("worker stops cleanly");
    info!(execs, prints, tops, "simulator finished");
}
