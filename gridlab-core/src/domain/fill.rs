use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A confirmed execution that belongs to the open basket.
///
/// Immutable once recorded; discarded when the basket resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub volume: Decimal,
    pub price: Decimal,
    /// Position of this fill within its basket (0 = initial entry).
    pub sequence_index: u32,
}

/// Execution report delivered by the external order layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillConfirmation {
    pub volume: Decimal,
    pub price: Decimal,
    /// True when this confirms a whole-basket flatten rather than an entry.
    pub is_flatten: bool,
}

impl FillConfirmation {
    pub fn entry(volume: Decimal, price: Decimal) -> Self {
        Self { volume, price, is_flatten: false }
    }

    pub fn flatten(volume: Decimal, price: Decimal) -> Self {
        Self { volume, price, is_flatten: true }
    }

    /// Positive volume and price.
    pub fn is_well_formed(&self) -> bool {
        self.volume > Decimal::ZERO && self.price > Decimal::ZERO
    }
}
