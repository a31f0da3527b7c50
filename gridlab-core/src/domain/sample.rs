//! PriceSample: one observation from the price feed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bar (high/low/close) or a tick (all three equal) with its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self { timestamp, high, low, close }
    }

    /// A single-price sample (tick).
    pub fn tick(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self::new(timestamp, price, price, price)
    }

    /// Sanity check: positive prices, high >= low, close inside the range.
    pub fn is_sane(&self) -> bool {
        self.low > Decimal::ZERO
            && self.high >= self.low
            && self.close <= self.high
            && self.close >= self.low
    }
}
