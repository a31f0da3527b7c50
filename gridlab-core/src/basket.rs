//! Basket bookkeeping: fills, volume-weighted average price, favorable extreme.
//!
//! **Invariant:** `total_volume > 0` exactly when `entry_count > 0`. Checked after every
//! mutation; a violation is returned as `EngineError::InvariantBroken`.

use crate::domain::{Direction, Fill};
use crate::error::EngineError;
use rust_decimal::Decimal;
use serde::Serialize;

/// The open fills of one accumulating position. Empty (`total_volume == 0`) means flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Basket {
    direction: Direction,
    fills: Vec<Fill>,
    /// Running Σ(price·volume). `average_price = notional / total_volume`.
    notional: Decimal,
    average_price: Decimal,
    total_volume: Decimal,
    extreme_price: Decimal,
    entry_count: u32,
}

impl Basket {
    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            fills: Vec::new(),
            notional: Decimal::ZERO,
            average_price: Decimal::ZERO,
            total_volume: Decimal::ZERO,
            extreme_price: Decimal::ZERO,
            entry_count: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Volume-weighted average entry price. Zero while empty.
    pub fn average_price(&self) -> Decimal {
        self.average_price
    }

    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Most favorable price seen since the basket opened. Zero while empty.
    pub fn extreme_price(&self) -> Decimal {
        self.extreme_price
    }

    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn last_fill_price(&self) -> Option<Decimal> {
        self.fills.last().map(|f| f.price)
    }

    /// Mark-to-market PnL of the basket at `price`.
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        self.direction.excursion(self.average_price, price) * self.total_volume
    }
}

/// Sole writer of a `Basket`.
#[derive(Debug, Clone)]
pub struct BasketTracker {
    basket: Basket,
}

impl BasketTracker {
    pub fn new(direction: Direction) -> Self {
        Self {
            basket: Basket::empty(direction),
        }
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    /// Append a confirmed fill and recompute the average in O(1).
    pub fn record_fill(&mut self, volume: Decimal, price: Decimal) -> Result<Fill, EngineError> {
        if volume <= Decimal::ZERO || price <= Decimal::ZERO {
            return Err(EngineError::InvariantBroken(format!(
                "fill must have positive volume and price, got {volume} @ {price}"
            )));
        }

        let b = &mut self.basket;
        let fill = Fill {
            volume,
            price,
            sequence_index: b.entry_count,
        };
        if b.is_empty() {
            b.extreme_price = price;
        }
        b.fills.push(fill);
        b.notional += price * volume;
        b.total_volume += volume;
        b.average_price = b.notional / b.total_volume;
        b.entry_count += 1;

        self.check_invariant()?;
        Ok(fill)
    }

    /// Fold a sample's range into the favorable extreme. No-op while empty.
    pub fn update_extreme(&mut self, high: Decimal, low: Decimal) {
        let b = &mut self.basket;
        if b.is_empty() {
            return;
        }
        let candidate = match b.direction {
            Direction::Long => high,
            Direction::Short => low,
        };
        b.extreme_price = b.direction.more_favorable(b.extreme_price, candidate);
    }

    /// Clear to empty. Called only after a confirmed full flatten.
    pub fn reset(&mut self) {
        self.basket = Basket::empty(self.basket.direction);
    }

    fn check_invariant(&self) -> Result<(), EngineError> {
        let b = &self.basket;
        let has_volume = b.total_volume > Decimal::ZERO;
        let has_entries = b.entry_count > 0;
        if has_volume != has_entries || b.fills.len() != b.entry_count as usize {
            tracing::error!(
                total_volume = %b.total_volume,
                entry_count = b.entry_count,
                fills = b.fills.len(),
                "basket invariant broken"
            );
            return Err(EngineError::InvariantBroken(format!(
                "total_volume {} with entry_count {} and {} fills",
                b.total_volume,
                b.entry_count,
                b.fills.len()
            )));
        }
        Ok(())
    }
}
