//! Fuzz — compares the engine against a naive but obviously-correct
//! reference book over randomized workloads.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use streetlob::{
    ring, CancelOrder, Command, Consumer, ExecEvent, ExecKind, MarketDataEvent, MatchingEngine,
    NewOrder, Price, Qty, Side,
};

const CAP: usize = 1 << 14;

/// Reference implementation: plain sorted maps, linear scans, no caching.
#[derive(Default)]
struct ReferenceBook {
    bids: BTreeMap<Price, Vec<(u64, Qty)>>,
    asks: BTreeMap<Price, Vec<(u64, Qty)>>,
    orders: std::collections::HashMap<u64, (Side, Price)>,
}

impl ReferenceBook {
    fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Match then rest; returns total traded quantity.
    fn place(&mut self, order_id: u64, side: Side, price: Price, mut qty: Qty) -> Qty {
        let mut traded = 0;
        match side {
            Side::Buy => {
                let mut emptied = Vec::new();
                for (&ask_price, level) in self.asks.iter_mut() {
                    if ask_price > price || qty == 0 {
                        break;
                    }
                    while !level.is_empty() && qty > 0 {
                        let fill = level[0].1.min(qty);
                        level[0].1 -= fill;
                        qty -= fill;
                        traded += fill;
                        if level[0].1 == 0 {
                            let (maker, _) = level.remove(0);
                            self.orders.remove(&maker);
                        }
                    }
                    if level.is_empty() {
                        emptied.push(ask_price);
                    }
                }
                for p in emptied {
                    self.asks.remove(&p);
                }
                if qty > 0 {
                    self.bids.entry(price).or_default().push((order_id, qty));
                    self.orders.insert(order_id, (Side::Buy, price));
                }
            }
            Side::Sell => {
                let mut emptied = Vec::new();
                let prices: Vec<Price> = self.bids.keys().rev().copied().collect();
                for bid_price in prices {
                    if bid_price < price || qty == 0 {
                        break;
                    }
                    let level = self.bids.get_mut(&bid_price).expect("price key just read");
                    while !level.is_empty() && qty > 0 {
                        let fill = level[0].1.min(qty);
                        level[0].1 -= fill;
                        qty -= fill;
                        traded += fill;
                        if level[0].1 == 0 {
                            let (maker, _) = level.remove(0);
                            self.orders.remove(&maker);
                        }
                    }
                    if level.is_empty() {
                        emptied.push(bid_price);
                    }
                }
                for p in emptied {
                    self.bids.remove(&p);
                }
                if qty > 0 {
                    self.asks.entry(price).or_default().push((order_id, qty));
                    self.orders.insert(order_id, (Side::Sell, price));
                }
            }
        }
        traded
    }

    fn cancel(&mut self, order_id: u64) -> bool {
        let Some((side, price)) = self.orders.remove(&order_id) else {
            return false;
        };
        let book = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = book.get_mut(&price) {
            level.retain(|(id, _)| *id != order_id);
            if level.is_empty() {
                book.remove(&price);
            }
        }
        true
    }
}

fn drain_traded(exec_rx: &mut Consumer<ExecEvent, CAP>) -> (Qty, bool) {
    let mut traded = 0;
    let mut canceled = false;
    while let Some(e) = exec_rx.pop() {
        match e.kind {
            ExecKind::Trade => traded += e.filled,
            ExecKind::CancelAck => canceled = true,
            _ => {}
        }
    }
    (traded, canceled)
}

#[test]
fn engine_matches_reference_model() {
    const SEED: u64 = 0xABCD_EF12_3456;
    const OPS: usize = 50_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let (exec_tx, mut exec_rx) = ring();
    let (md_tx, mut md_rx) = ring::<MarketDataEvent, CAP>();
    let mut engine: MatchingEngine<CAP> = MatchingEngine::new(exec_tx, md_tx);
    let mut reference = ReferenceBook::default();

    let mut next_order_id = 1u64;
    let mut resting: Vec<u64> = Vec::new();

    for step in 0..OPS {
        if resting.is_empty() || rng.gen_bool(0.7) {
            let order_id = next_order_id;
            next_order_id += 1;
            let side = if rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            let price = rng.gen_range(9_000..11_000);
            let qty = rng.gen_range(1..500);

            engine
                .on_command(&Command::New(NewOrder::day(order_id, 1, side, price, qty)))
                .unwrap();
            let (traded, _) = drain_traded(&mut exec_rx);

            let ref_traded = reference.place(order_id, side, price, qty);
            assert_eq!(traded, ref_traded, "traded qty diverged at step {step}");

            if traded < qty {
                resting.push(order_id);
            }
        } else {
            let idx = rng.gen_range(0..resting.len());
            let order_id = resting.swap_remove(idx);

            engine
                .on_command(&Command::Cancel(CancelOrder {
                    order_id,
                    user_id: 1,
                    ts_ns: 0,
                }))
                .unwrap();
            let (_, canceled) = drain_traded(&mut exec_rx);

            let ref_canceled = reference.cancel(order_id);
            assert_eq!(canceled, ref_canceled, "cancel outcome diverged at {step}");
        }

        while md_rx.pop().is_some() {}

        assert_eq!(
            engine.book().best_bid(),
            reference.best_bid(),
            "best bid diverged at step {step}"
        );
        assert_eq!(
            engine.book().best_ask(),
            reference.best_ask(),
            "best ask diverged at step {step}"
        );
        assert_eq!(
            engine.book().order_count(),
            reference.order_count(),
            "order count diverged at step {step}"
        );
    }
}

#[test]
fn top_quantities_match_reference_sums() {
    const SEED: u64 = 77;
    const OPS: usize = 5_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let (exec_tx, mut exec_rx) = ring::<ExecEvent, CAP>();
    let (md_tx, mut md_rx) = ring::<MarketDataEvent, CAP>();
    let mut engine: MatchingEngine<CAP> = MatchingEngine::new(exec_tx, md_tx);
    let mut reference = ReferenceBook::default();

    for order_id in 1..=OPS as u64 {
        let side = if rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };
        let price = rng.gen_range(9_990..10_010);
        let qty = rng.gen_range(1..50);

        engine
            .on_command(&Command::New(NewOrder::day(order_id, 1, side, price, qty)))
            .unwrap();
        reference.place(order_id, side, price, qty);

        while exec_rx.pop().is_some() {}
        while md_rx.pop().is_some() {}

        let top = engine.top_snapshot();
        let ref_bid_qty: Qty = reference
            .best_bid()
            .and_then(|p| reference.bids.get(&p))
            .map_or(0, |level| level.iter().map(|(_, q)| q).sum());
        let ref_ask_qty: Qty = reference
            .best_ask()
            .and_then(|p| reference.asks.get(&p))
            .map_or(0, |level| level.iter().map(|(_, q)| q).sum());
        assert_eq!(top.bid_qty, ref_bid_qty);
        assert_eq!(top.ask_qty, ref_ask_qty);
    }
}
