//! Basket direction, threaded explicitly through every component.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an accumulating basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Signed distance the market has moved in this direction's favor, from `reference` to `price`.
    pub fn excursion(self, reference: Decimal, price: Decimal) -> Decimal {
        match self {
            Direction::Long => price - reference,
            Direction::Short => reference - price,
        }
    }

    /// Shift `price` by `distance` toward profit (up for longs, down for shorts).
    pub fn toward_profit(self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Direction::Long => price + distance,
            Direction::Short => price - distance,
        }
    }

    /// Shift `price` by `distance` toward loss (down for longs, up for shorts).
    pub fn toward_loss(self, price: Decimal, distance: Decimal) -> Decimal {
        match self {
            Direction::Long => price - distance,
            Direction::Short => price + distance,
        }
    }

    /// The more favorable of two prices for this direction.
    pub fn more_favorable(self, a: Decimal, b: Decimal) -> Decimal {
        match self {
            Direction::Long => a.max(b),
            Direction::Short => a.min(b),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn excursion_sign_follows_direction() {
        assert_eq!(Direction::Long.excursion(dec!(100), dec!(104)), dec!(4));
        assert_eq!(Direction::Short.excursion(dec!(100), dec!(104)), dec!(-4));
    }

    #[test]
    fn offsets_mirror_between_sides() {
        assert_eq!(Direction::Long.toward_profit(dec!(100), dec!(5)), dec!(105));
        assert_eq!(Direction::Short.toward_profit(dec!(100), dec!(5)), dec!(95));
        assert_eq!(Direction::Long.toward_loss(dec!(100), dec!(5)), dec!(95));
        assert_eq!(Direction::Short.toward_loss(dec!(100), dec!(5)), dec!(105));
    }

    #[test]
    fn more_favorable_picks_extreme() {
        assert_eq!(Direction::Long.more_favorable(dec!(101), dec!(99)), dec!(101));
        assert_eq!(Direction::Short.more_favorable(dec!(101), dec!(99)), dec!(99));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Direction::Short).unwrap();
        assert_eq!(json, "\"short\"");
    }
}
