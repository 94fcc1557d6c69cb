//! Per-strategy risk limits: position, notional, and per-order size.
//!
//! The tracker is per-instance and lives on the strategy's consumer
//! thread, so plain fields suffice. The strategy feeds it fills with the
//! side it knows from its own open-order map.

use crate::command::{Price, Qty, Side};

/// Static limits a strategy must stay inside.
#[derive(Clone, Copy, Debug)]
pub struct RiskLimits {
    /// Cap on |signed position| in lots.
    pub max_position: i64,
    /// Cap on accumulated |price * qty| across fills.
    pub max_notional: i64,
    /// Cap on a single order's quantity.
    pub max_order_qty: Qty,
}

/// Running position and notional against a set of limits.
#[derive(Debug)]
pub struct RiskManager {
    limits: RiskLimits,
    position: i64,
    notional: i64,
}

impl RiskManager {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            position: 0,
            notional: 0,
        }
    }

    /// Whether a quote of `qty` lots is currently allowed.
    pub fn can_quote(&self, qty: Qty) -> bool {
        qty <= self.limits.max_order_qty
            && self.position.abs() < self.limits.max_position
            && self.notional < self.limits.max_notional
    }

    /// Apply one fill. `side` is the side of *our* order that traded.
    pub fn on_fill(&mut self, side: Side, price: Price, qty: Qty) {
        match side {
            Side::Buy => self.position += i64::from(qty),
            Side::Sell => self.position -= i64::from(qty),
        }
        self.notional += (price * i64::from(qty)).abs();
    }

    /// Signed position in lots.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Accumulated |price * qty| across fills.
    pub fn notional(&self) -> i64 {
        self.notional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> RiskManager {
        RiskManager::new(RiskLimits {
            max_position: 10,
            max_notional: 100_000,
            max_order_qty: 5,
        })
    }

    #[test]
    fn tracks_signed_position() {
        let mut risk = manager();
        risk.on_fill(Side::Buy, 100, 4);
        assert_eq!(risk.position(), 4);
        risk.on_fill(Side::Sell, 100, 7);
        assert_eq!(risk.position(), -3);
    }

    #[test]
    fn accumulates_notional() {
        let mut risk = manager();
        risk.on_fill(Side::Buy, 100, 4);
        risk.on_fill(Side::Sell, 50, 2);
        assert_eq!(risk.notional(), 500);
    }

    #[test]
    fn blocks_oversized_orders() {
        let risk = manager();
        assert!(risk.can_quote(5));
        assert!(!risk.can_quote(6));
    }

    #[test]
    fn blocks_when_position_limit_hit() {
        let mut risk = manager();
        for _ in 0..2 {
            risk.on_fill(Side::Buy, 100, 5);
        }
        assert_eq!(risk.position(), 10);
        assert!(!risk.can_quote(1));

        risk.on_fill(Side::Sell, 100, 5);
        assert!(risk.can_quote(1));
    }

    #[test]
    fn blocks_when_notional_limit_hit() {
        let mut risk = manager();
        risk.on_fill(Side::Buy, 50_000, 2);
        assert_eq!(risk.notional(), 100_000);
        assert!(!risk.can_quote(1));
    }
}
