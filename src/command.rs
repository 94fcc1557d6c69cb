//! Command and event types flowing through the engine queues.
//!
//! Commands are inputs from producer threads (strategies, tests).
//! Exec events report order outcomes; market-data events feed quote
//! consumers. Everything is a small `Copy` record so queue traffic
//! stays allocation-free.

use std::sync::OnceLock;
use std::time::Instant;

/// Price in integer ticks. No floating point anywhere near the book.
pub type Price = i64;

/// Quantity in integer lots.
pub type Qty = i32;

/// Monotonic nanoseconds since process start. Immune to wall-clock
/// adjustments, so event ordering and latency deltas stay meaningful.
#[inline]
pub fn now_ns() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Time-in-force: what happens to quantity left after matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Tif {
    /// Residue rests in the book.
    #[default]
    Day = 0,
    /// Residue is discarded.
    Ioc = 1,
    /// All-or-nothing: reject unless the whole order can fill.
    Fok = 2,
}

// ============================================================================
// Input Commands
// ============================================================================

/// Submit a new order.
#[derive(Clone, Copy, Debug)]
pub struct NewOrder {
    /// Client-assigned order id, globally unique among live orders.
    pub order_id: u64,
    pub user_id: u64,
    pub side: Side,
    /// Limit price in ticks.
    pub price: Price,
    /// Quantity in lots, > 0.
    pub qty: Qty,
    pub tif: Tif,
    /// Submit time; 0 means "stamp on arrival".
    pub ts_ns: u64,
}

impl NewOrder {
    /// A resting-eligible Day order (most common case).
    #[inline]
    pub const fn day(order_id: u64, user_id: u64, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            order_id,
            user_id,
            side,
            price,
            qty,
            tif: Tif::Day,
            ts_ns: 0,
        }
    }

    /// An immediate-or-cancel order.
    #[inline]
    pub const fn ioc(order_id: u64, user_id: u64, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            order_id,
            user_id,
            side,
            price,
            qty,
            tif: Tif::Ioc,
            ts_ns: 0,
        }
    }

    /// A fill-or-kill order.
    #[inline]
    pub const fn fok(order_id: u64, user_id: u64, side: Side, price: Price, qty: Qty) -> Self {
        Self {
            order_id,
            user_id,
            side,
            price,
            qty,
            tif: Tif::Fok,
            ts_ns: 0,
        }
    }
}

/// Cancel a resting order by id.
#[derive(Clone, Copy, Debug)]
pub struct CancelOrder {
    pub order_id: u64,
    pub user_id: u64,
    pub ts_ns: u64,
}

/// Input commands from producer threads.
#[derive(Clone, Copy, Debug)]
pub enum Command {
    New(NewOrder),
    Cancel(CancelOrder),
}

// ============================================================================
// Exec Events
// ============================================================================

/// Outcome class of an exec event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExecKind {
    /// Order accepted; `leaves` carries the resting quantity (0 for IOC).
    Ack = 0,
    /// One fill; `filled`/`price` carry the fill, `leaves` what remains.
    Trade = 1,
    /// Cancel succeeded.
    CancelAck = 2,
    /// Command refused; `reason` says why.
    Reject = 3,
}

/// Reasons a command is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    /// Cancel targeted an id that is not resting.
    UnknownOrderId = 0,
    /// FOK order could not fill in full.
    FokNotFilled = 1,
    /// New order with qty <= 0.
    InvalidQuantity = 2,
}

impl RejectReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            RejectReason::UnknownOrderId => "unknown order id",
            RejectReason::FokNotFilled => "FOK not fully filled",
            RejectReason::InvalidQuantity => "invalid quantity",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution report from the engine to the order's owner.
/// Only the fields relevant to `kind` carry meaning.
#[derive(Clone, Copy, Debug)]
pub struct ExecEvent {
    pub kind: ExecKind,
    pub order_id: u64,
    pub user_id: u64,
    /// Fill quantity (Trade only).
    pub filled: Qty,
    /// Fill price (Trade only); always the resting order's price.
    pub price: Price,
    /// Quantity still live after this event.
    pub leaves: Qty,
    /// Set for Reject only.
    pub reason: Option<RejectReason>,
    pub ts_ns: u64,
}

impl ExecEvent {
    pub fn ack(order_id: u64, user_id: u64, leaves: Qty, ts_ns: u64) -> Self {
        Self {
            kind: ExecKind::Ack,
            order_id,
            user_id,
            filled: 0,
            price: 0,
            leaves,
            reason: None,
            ts_ns,
        }
    }

    pub fn trade(
        order_id: u64,
        user_id: u64,
        filled: Qty,
        price: Price,
        leaves: Qty,
        ts_ns: u64,
    ) -> Self {
        Self {
            kind: ExecKind::Trade,
            order_id,
            user_id,
            filled,
            price,
            leaves,
            reason: None,
            ts_ns,
        }
    }

    pub fn cancel_ack(order_id: u64, user_id: u64, ts_ns: u64) -> Self {
        Self {
            kind: ExecKind::CancelAck,
            order_id,
            user_id,
            filled: 0,
            price: 0,
            leaves: 0,
            reason: None,
            ts_ns,
        }
    }

    pub fn reject(order_id: u64, user_id: u64, reason: RejectReason, ts_ns: u64) -> Self {
        Self {
            kind: ExecKind::Reject,
            order_id,
            user_id,
            filled: 0,
            price: 0,
            leaves: 0,
            reason: Some(reason),
            ts_ns,
        }
    }
}

// ============================================================================
// Market Data Events
// ============================================================================

/// Best bid/ask snapshot. A side with no liquidity reports price and
/// quantity both zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TopOfBook {
    pub bid_price: Price,
    pub bid_qty: Qty,
    pub ask_price: Price,
    pub ask_qty: Qty,
    pub ts_ns: u64,
}

/// One executed trade, as the market sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradePrint {
    pub price: Price,
    pub qty: Qty,
    pub aggressor: Side,
    pub ts_ns: u64,
}

/// Market-data feed emitted by the engine.
#[derive(Clone, Copy, Debug)]
pub enum MarketDataEvent {
    Top(TopOfBook),
    Trade(TradePrint),
}
