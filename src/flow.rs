//! Street-flow generator: deterministic synthetic counterparty orders.
//!
//! Keeps the book lively by seeding symmetric depth around a mid price and
//! then, step by step, either moving the mid with a marketable IOC order or
//! adding passive liquidity that widens or tightens the spread. Runs on the
//! engine thread and injects orders through the matching engine directly,
//! so the command queue stays single-producer.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::command::{now_ns, Command, NewOrder, Price, Qty, Side, Tif};
use crate::errors::EngineError;
use crate::matching::MatchingEngine;
use crate::order_book::OrderBook;

/// User id stamped on all synthetic orders.
pub const STREET_USER: u64 = 999_999;

/// Synthetic order ids start here so they can never collide with ids
/// chosen by embedders, which use the low range.
pub const STREET_ORDER_ID_BASE: u64 = 1 << 56;

/// Street-flow tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct FlowConfig {
    /// Mid price in ticks that depth is seeded around.
    pub mid: Price,
    /// Price increment.
    pub tick: Price,
    /// Quantity increment; seeded depth is 10 lots, step orders 5 lots.
    pub lot: Qty,
    /// Probability a non-moving step tightens rather than widens.
    pub spread_prob: f64,
    /// Probability a step sends a marketable order.
    pub move_prob: f64,
    /// Levels seeded on each side at start.
    pub max_depth: u32,
    /// RNG seed; identical seeds give identical command sequences.
    pub seed: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            mid: 10_000,
            tick: 1,
            lot: 1,
            spread_prob: 0.6,
            move_prob: 0.55,
            max_depth: 5,
            seed: 42,
        }
    }
}

/// Deterministically seeded source of street flow.
pub struct FlowGenerator {
    cfg: FlowConfig,
    rng: ChaCha8Rng,
    next_order_id: u64,
}

impl FlowGenerator {
    pub fn new(cfg: FlowConfig) -> Self {
        Self {
            cfg,
            rng: ChaCha8Rng::seed_from_u64(cfg.seed),
            next_order_id: STREET_ORDER_ID_BASE,
        }
    }

    #[inline]
    pub fn config(&self) -> &FlowConfig {
        &self.cfg
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// Seed symmetric passive depth around the configured mid:
    /// one bid at `mid - i*tick` and one ask at `mid + i*tick` per level,
    /// 10 lots each.
    pub fn seed_book(&mut self, book: &mut OrderBook) -> Result<(), EngineError> {
        let qty = 10 * self.cfg.lot;
        for i in 1..=self.cfg.max_depth as Price {
            let bid = NewOrder {
                order_id: self.next_id(),
                user_id: STREET_USER,
                side: Side::Buy,
                price: self.cfg.mid - i * self.cfg.tick,
                qty,
                tif: Tif::Day,
                ts_ns: now_ns(),
            };
            let ask = NewOrder {
                order_id: self.next_id(),
                user_id: STREET_USER,
                side: Side::Sell,
                price: self.cfg.mid + i * self.cfg.tick,
                qty,
                tif: Tif::Day,
                ts_ns: now_ns(),
            };
            book.add_passive(&bid)?;
            book.add_passive(&ask)?;
        }
        Ok(())
    }

    /// One step of exogenous flow, injected through the engine on the
    /// calling (engine) thread.
    ///
    /// Draws, in order: move? then widen? then (if moving) a fair coin for
    /// lift-the-ask vs hit-the-bid. The draw order is part of the
    /// determinism contract.
    pub fn step<const N: usize>(
        &mut self,
        engine: &mut MatchingEngine<N>,
    ) -> Result<(), EngineError> {
        let move_mid = self.rng.gen_bool(self.cfg.move_prob);
        let widen = self.rng.gen_bool(1.0 - self.cfg.spread_prob);

        let top = engine.top_snapshot();
        let best_bid = if top.bid_price != 0 {
            top.bid_price
        } else {
            self.cfg.mid - self.cfg.tick
        };
        let best_ask = if top.ask_price != 0 {
            top.ask_price
        } else {
            self.cfg.mid + self.cfg.tick
        };

        let qty = 5 * self.cfg.lot;
        if move_mid {
            // Marketable order to shift the mid by a tick.
            let (side, price) = if self.rng.gen_bool(0.5) {
                (Side::Buy, best_ask) // lift the ask
            } else {
                (Side::Sell, best_bid) // hit the bid
            };
            let order = NewOrder {
                order_id: self.next_id(),
                user_id: STREET_USER,
                side,
                price,
                qty,
                tif: Tif::Ioc,
                ts_ns: now_ns(),
            };
            engine.on_command(&Command::New(order))?;
        } else {
            // Passive pair: outside the top to widen, inside to tighten.
            let (bid_px, ask_px) = if widen {
                (best_bid - self.cfg.tick, best_ask + self.cfg.tick)
            } else {
                (best_bid + self.cfg.tick, best_ask - self.cfg.tick)
            };
            let bid = NewOrder {
                order_id: self.next_id(),
                user_id: STREET_USER,
                side: Side::Buy,
                price: bid_px,
                qty,
                tif: Tif::Day,
                ts_ns: now_ns(),
            };
            let ask = NewOrder {
                order_id: self.next_id(),
                user_id: STREET_USER,
                side: Side::Sell,
                price: ask_px,
                qty,
                tif: Tif::Day,
                ts_ns: now_ns(),
            };
            engine.on_command(&Command::New(bid))?;
            engine.on_command(&Command::New(ask))?;
        }
        Ok(())
    }
}
