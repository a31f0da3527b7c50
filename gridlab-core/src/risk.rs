//! RiskLevels: stop, take-profit and trailing levels of the open basket.
//!
//! Stop and take-profit are rebuilt from the basket's average price whenever a fill changes it.
//! The trailing level is the only field that evolves on its own, through `TrailingLock`.

use crate::basket::Basket;
use crate::config::{EngineConfig, TakeProfitPolicy};
use crate::domain::ExchangeConstraints;
use rust_decimal::Decimal;
use serde::Serialize;

/// Exit levels of the open basket. All `None` while flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskLevels {
    pub stop_price: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
    pub trailing_stop_price: Option<Decimal>,
}

impl RiskLevels {
    /// True when no level is set.
    pub fn is_empty(&self) -> bool {
        self.stop_price.is_none()
            && self.take_profit_price.is_none()
            && self.trailing_stop_price.is_none()
    }
}

/// Derives stop and take-profit levels from a basket.
#[derive(Debug, Clone)]
pub struct RiskCalculator {
    take_profit_distance: Decimal,
    take_profit_policy: TakeProfitPolicy,
    stop_loss_distance: Option<Decimal>,
    constraints: ExchangeConstraints,
}

impl RiskCalculator {
    /// Create a calculator from engine parameters and the price tick.
    pub fn new(config: &EngineConfig, constraints: &ExchangeConstraints) -> Self {
        Self {
            take_profit_distance: config.take_profit_distance,
            take_profit_policy: config.take_profit_policy,
            stop_loss_distance: config.stop_loss_distance,
            constraints: constraints.clone(),
        }
    }

    /// Rebuild stop and take-profit after the average price changed. Trailing is carried over.
    pub fn recompute(&self, basket: &Basket, previous: &RiskLevels) -> RiskLevels {
        let Some(first) = basket.fills().first() else {
            return RiskLevels::default();
        };
        let direction = basket.direction();
        let average = basket.average_price();

        let take_profit = match self.take_profit_policy {
            TakeProfitPolicy::Recompute => direction.toward_profit(average, self.take_profit_distance),
            TakeProfitPolicy::FixedIncrement { increment } => {
                let layered = Decimal::from(basket.entry_count() - 1);
                direction.toward_profit(first.price, self.take_profit_distance + increment * layered)
            }
        };
        let stop = self
            .stop_loss_distance
            .map(|distance| direction.toward_loss(average, distance));

        RiskLevels {
            stop_price: stop.map(|p| self.round(p)),
            take_profit_price: Some(self.round(take_profit)),
            trailing_stop_price: previous.trailing_stop_price,
        }
    }

    fn round(&self, price: Decimal) -> Decimal {
        self.constraints.round_price(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::BasketTracker;
    use crate::domain::Direction;
    use rust_decimal_macros::dec;

    fn calc(config: &EngineConfig) -> RiskCalculator {
        RiskCalculator::new(config, &ExchangeConstraints::unconstrained())
    }

    #[test]
    fn empty_basket_has_no_levels() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5));
        let levels = calc(&cfg).recompute(&Basket::empty(Direction::Long), &RiskLevels::default());
        assert!(levels.is_empty());
    }

    #[test]
    fn long_levels_follow_average() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5)).with_stop_loss(dec!(5));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        let levels = calc(&cfg).recompute(tracker.basket(), &RiskLevels::default());
        assert_eq!(levels.take_profit_price, Some(dec!(105)));
        assert_eq!(levels.stop_price, Some(dec!(95)));

        tracker.record_fill(dec!(1), dec!(90)).unwrap();
        let levels = calc(&cfg).recompute(tracker.basket(), &levels);
        assert_eq!(levels.take_profit_price, Some(dec!(100)));
        assert_eq!(levels.stop_price, Some(dec!(90)));
    }

    #[test]
    fn short_levels_are_mirrored() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5)).with_stop_loss(dec!(8));
        let mut tracker = BasketTracker::new(Direction::Short);
        tracker.record_fill(dec!(2), dec!(100)).unwrap();
        let levels = calc(&cfg).recompute(tracker.basket(), &RiskLevels::default());
        assert_eq!(levels.take_profit_price, Some(dec!(95)));
        assert_eq!(levels.stop_price, Some(dec!(108)));
    }

    #[test]
    fn fixed_increment_ignores_new_average() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5))
            .with_take_profit_policy(TakeProfitPolicy::FixedIncrement { increment: dec!(-2) });
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        let levels = calc(&cfg).recompute(tracker.basket(), &RiskLevels::default());
        assert_eq!(levels.take_profit_price, Some(dec!(105)));

        tracker.record_fill(dec!(1), dec!(80)).unwrap();
        let levels = calc(&cfg).recompute(tracker.basket(), &levels);
        assert_eq!(levels.take_profit_price, Some(dec!(103)));
    }

    #[test]
    fn trailing_level_survives_recompute() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        let previous = RiskLevels {
            trailing_stop_price: Some(dec!(101)),
            ..RiskLevels::default()
        };
        let levels = calc(&cfg).recompute(tracker.basket(), &previous);
        assert_eq!(levels.trailing_stop_price, Some(dec!(101)));
    }
}
