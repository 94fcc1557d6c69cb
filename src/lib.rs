//! # streetlob
//!
//! A single-instrument, in-process matching-engine simulator.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: one thread owns the order book exclusively (no locks)
//! - **Integer Pricing**: prices in ticks, quantities in lots, no floats
//! - **Lock-Free Plumbing**: SPSC ring queues with explicit memory ordering
//!   are the only shared state
//! - **Deterministic Flow**: seeded street flow replays byte-for-byte
//!
//! ## Architecture
//!
//! ```text
//! [Producer Thread] --Command--> [SPSC] --> [Engine Worker Thread]
//!                                             | book + matching + flow
//!                         [SPSC] <--ExecEvent-+
//!                         [SPSC] <--MarketDataEvent
//!       [Consumer Threads] pop execs / market data
//! ```

pub mod command;
pub mod engine;
pub mod errors;
pub mod flow;
pub mod matching;
pub mod order_book;
pub mod risk;
pub mod spsc;
pub mod strategy;

// Re-exports for convenience
pub use command::{
    now_ns, CancelOrder, Command, ExecEvent, ExecKind, MarketDataEvent, NewOrder, Price, Qty,
    RejectReason, Side, Tif, TopOfBook, TradePrint,
};
pub use engine::EngineWorker;
pub use errors::{EngineError, WorkerError};
pub use flow::{FlowConfig, FlowGenerator, STREET_USER};
pub use matching::MatchingEngine;
pub use order_book::{Order, OrderBook};
pub use risk::{RiskLimits, RiskManager};
pub use spsc::{ring, Consumer, Producer};
pub use strategy::{MeanReversion, Strategy, StrategyContext};

/// Default capacity for the three engine queues.
pub const DEFAULT_QUEUE_CAP: usize = 1 << 14;
