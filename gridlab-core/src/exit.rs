//! ExitDecider: whether a sample closes the basket.
//!
//! Evaluation order, first match wins:
//! 1. Take-profit (long: high >= target, short: low <= target)
//! 2. Trailing, when armed (long: low <= level, short: high >= level)
//! 3. Stop-loss, when configured (long: low <= stop, short: high >= stop)
//!
//! A sample whose range spans both take-profit and a stop resolves to take-profit. This is a
//! fixed tie-break, not a model of the intrabar path.

use crate::basket::Basket;
use crate::domain::Direction;
use crate::risk::RiskLevels;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitDecision {
    None,
    FlattenAtStop,
    FlattenAtTake,
    FlattenAtTrail,
}

impl ExitDecision {
    pub fn is_exit(self) -> bool {
        self != ExitDecision::None
    }
}

pub struct ExitDecider;

impl ExitDecider {
    pub fn evaluate(
        basket: &Basket,
        sample_high: Decimal,
        sample_low: Decimal,
        levels: &RiskLevels,
    ) -> ExitDecision {
        if basket.is_empty() {
            return ExitDecision::None;
        }
        let direction = basket.direction();

        // Price reaching `level` in the profitable direction.
        let reached_profit = |level: Decimal| match direction {
            Direction::Long => sample_high >= level,
            Direction::Short => sample_low <= level,
        };
        // Price reaching `level` in the losing direction.
        let reached_loss = |level: Decimal| match direction {
            Direction::Long => sample_low <= level,
            Direction::Short => sample_high >= level,
        };

        if levels.take_profit_price.is_some_and(reached_profit) {
            ExitDecision::FlattenAtTake
        } else if levels.trailing_stop_price.is_some_and(reached_loss) {
            ExitDecision::FlattenAtTrail
        } else if levels.stop_price.is_some_and(reached_loss) {
            ExitDecision::FlattenAtStop
        } else {
            ExitDecision::None
        }
    }
}
