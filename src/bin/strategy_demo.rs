//! Engine + street flow + mean-reversion strategy. Runs for five seconds
//! and exits.
//!
//! One consumer thread drains both output queues and drives the strategy
//! timer, which keeps each queue strictly single-consumer and the strategy
//! free of synchronisation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use streetlob::{
    now_ns, ring, Command, EngineWorker, ExecEvent, ExecKind, FlowConfig, MarketDataEvent,
    MeanReversion, RiskLimits, RiskManager, Strategy, StrategyContext, DEFAULT_QUEUE_CAP,
};
use tracing::info;

const CAP: usize = DEFAULT_QUEUE_CAP;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let (cmd_tx, cmd_rx) = ring::<Command, CAP>();
    let (exec_tx, mut exec_rx) = ring::<ExecEvent, CAP>();
    let (md_tx, mut md_rx) = ring::<MarketDataEvent, CAP>();

    let mut worker =
        EngineWorker::new(cmd_rx, exec_tx, md_tx, FlowConfig::default()).with_core_pinning();
    worker.start().expect("fresh worker starts");

    let ctx = StrategyContext {
        next_order_id: 1,
        user_id: 1,
        tick: 1,
    };
    let risk = RiskManager::new(RiskLimits {
        max_position: 100,
        max_notional: 1_000_000_000,
        max_order_qty: 10,
    });
    let mut strat = MeanReversion::new(ctx, risk, cmd_tx, 64, 2.0, 2);

    let running = Arc::new(AtomicBool::new(true));
    let consumer_running = Arc::clone(&running);

    let consumer = thread::spawn(move || {
        let mut our_trades = 0u64;
        while consumer_running.load(Ordering::Acquire) {
            while let Some(event) = exec_rx.pop() {
                if event.kind == ExecKind::Trade && event.user_id == 1 {
                    our_trades += 1;
                }
                strat.on_exec(&event);
            }
            while let Some(event) = md_rx.pop() {
                strat.on_market_data(&event);
            }
            strat.on_timer(now_ns());
            thread::sleep(Duration::from_micros(200));
        }
        (our_trades, strat)
    });

    thread::sleep(Duration::from_secs(5));
    running.store(false, Ordering::Release);

    let (our_trades, strat) = consumer.join().expect("consumer thread joins");
    worker.stop().expect("worker stops cleanly");

    info!(
        trades = our_trades,
        position = strat.risk().position(),
        notional = strat.risk().notional(),
        "strategy demo finished"
    );
}
