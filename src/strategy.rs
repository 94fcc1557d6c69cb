//! Strategy interface and a small mean-reversion maker.
//!
//! Strategies consume exec and market-data events on their own thread and
//! push commands back into the engine through the command queue. The core
//! engine does not depend on anything here.

use rustc_hash::FxHashMap;

use crate::command::{
    CancelOrder, Command, ExecEvent, ExecKind, MarketDataEvent, NewOrder, Price, Qty, Side, Tif,
    TopOfBook,
};
use crate::risk::RiskManager;
use crate::spsc::Producer;

/// Per-strategy identity and instrument parameters.
#[derive(Clone, Copy, Debug)]
pub struct StrategyContext {
    /// Sequence for this strategy's order ids. Keep strategies in
    /// disjoint ranges; street flow lives above `1 << 56`.
    pub next_order_id: u64,
    pub user_id: u64,
    pub tick: Price,
}

/// Event-driven strategy interface.
pub trait Strategy {
    fn on_market_data(&mut self, event: &MarketDataEvent);
    fn on_exec(&mut self, event: &ExecEvent);
    fn on_timer(&mut self, ts_ns: u64);
}

/// Fixed-length rolling mean of mid prices.
struct RollingMean {
    window: Vec<Price>,
    cursor: usize,
    filled: usize,
}

impl RollingMean {
    fn new(len: usize) -> Self {
        Self {
            window: vec![0; len.max(1)],
            cursor: 0,
            filled: 0,
        }
    }

    fn push(&mut self, mid: Price) {
        self.window[self.cursor] = mid;
        self.cursor = (self.cursor + 1) % self.window.len();
        self.filled = (self.filled + 1).min(self.window.len());
    }

    fn mean(&self) -> Option<f64> {
        if self.filled == 0 {
            return None;
        }
        let sum: i128 = self.window[..self.filled]
            .iter()
            .map(|&p| i128::from(p))
            .sum();
        Some(sum as f64 / self.filled as f64)
    }
}

/// A small mean-reversion maker: track a rolling mean of the mid, quote
/// both sides around the mid when risk allows, cancel the previous pair
/// before re-quoting, and lean a tick against the deviation.
pub struct MeanReversion<const N: usize> {
    ctx: StrategyContext,
    risk: RiskManager,
    out: Producer<Command, N>,
    mids: RollingMean,
    dev_ticks: f64,
    quote_qty: Qty,
    last_top: TopOfBook,
    /// Our two live quotes from the previous timer tick, if any.
    last_bid_id: Option<u64>,
    last_ask_id: Option<u64>,
    /// Side of every order we still consider open, for risk attribution.
    open_sides: FxHashMap<u64, Side>,
}

impl<const N: usize> MeanReversion<N> {
    pub fn new(
        ctx: StrategyContext,
        risk: RiskManager,
        out: Producer<Command, N>,
        window_len: usize,
        dev_ticks: f64,
        quote_qty: Qty,
    ) -> Self {
        Self {
            ctx,
            risk,
            out,
            mids: RollingMean::new(window_len),
            dev_ticks,
            quote_qty,
            last_top: TopOfBook::default(),
            last_bid_id: None,
            last_ask_id: None,
            open_sides: FxHashMap::default(),
        }
    }

    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    fn next_id(&mut self) -> u64 {
        let id = self.ctx.next_order_id;
        self.ctx.next_order_id += 1;
        id
    }

    fn send_new(&mut self, side: Side, price: Price, qty: Qty, ts_ns: u64) -> u64 {
        let order_id = self.next_id();
        let cmd = Command::New(NewOrder {
            order_id,
            user_id: self.ctx.user_id,
            side,
            price,
            qty,
            tif: Tif::Day,
            ts_ns,
        });
        if self.out.push(cmd).is_ok() {
            self.open_sides.insert(order_id, side);
        }
        order_id
    }

    fn send_cancel(&mut self, order_id: u64, ts_ns: u64) {
        let cmd = Command::Cancel(CancelOrder {
            order_id,
            user_id: self.ctx.user_id,
            ts_ns,
        });
        let _ = self.out.push(cmd);
    }
}

impl<const N: usize> Strategy for MeanReversion<N> {
    fn on_market_data(&mut self, event: &MarketDataEvent) {
        if let MarketDataEvent::Top(top) = event {
            self.last_top = *top;
            if top.bid_price > 0 && top.ask_price > 0 {
                self.mids.push((top.bid_price + top.ask_price) / 2);
            }
        }
    }

    fn on_exec(&mut self, event: &ExecEvent) {
        match event.kind {
            ExecKind::Trade => {
                if let Some(&side) = self.open_sides.get(&event.order_id) {
                    self.risk.on_fill(side, event.price, event.filled);
                    if event.leaves == 0 {
                        self.open_sides.remove(&event.order_id);
                    }
                }
            }
            ExecKind::CancelAck | ExecKind::Reject => {
                self.open_sides.remove(&event.order_id);
            }
            ExecKind::Ack => {
                if event.leaves == 0 {
                    self.open_sides.remove(&event.order_id);
                }
            }
        }
    }

    fn on_timer(&mut self, ts_ns: u64) {
        if self.last_top.bid_price == 0 || self.last_top.ask_price == 0 {
            return;
        }
        let mid = (self.last_top.bid_price + self.last_top.ask_price) / 2;
        let Some(mean) = self.mids.mean() else { return };

        // Pull the previous pair before re-quoting.
        if let Some(id) = self.last_bid_id.take() {
            self.send_cancel(id, ts_ns);
        }
        if let Some(id) = self.last_ask_id.take() {
            self.send_cancel(id, ts_ns);
        }

        if !self.risk.can_quote(self.quote_qty) {
            return;
        }

        let edge = (self.dev_ticks * self.ctx.tick as f64).round() as Price;
        let deviation = mid as f64 - mean;
        // Lean one tick against the deviation: quote lower when rich,
        // higher when cheap.
        let lean = if deviation > edge as f64 {
            -self.ctx.tick
        } else if deviation < -(edge as f64) {
            self.ctx.tick
        } else {
            0
        };

        let bid = self.send_new(Side::Buy, mid - edge + lean, self.quote_qty, ts_ns);
        let ask = self.send_new(Side::Sell, mid + edge + lean, self.quote_qty, ts_ns);
        self.last_bid_id = Some(bid);
        self.last_ask_id = Some(ask);
    }
}
