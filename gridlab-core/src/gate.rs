//! EntryGate: whether another layered entry may be placed at the current price.
//!
//! Rules:
//! 1. Never more than `max_entries` fills in one basket.
//! 2. The first entry is always permitted.
//! 3. Later entries need `|price - last_fill_price| >= effective_step`, where the step widens
//!    by `price_step_scale_factor ^ entry_count` when step scaling is enabled.
//! 4. With `adverse_only`, the move must also be against the basket.

use crate::basket::Basket;
use crate::config::EngineConfig;
use crate::sizer::scaled;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct EntryGate {
    max_entries: u32,
    min_entry_spacing: Decimal,
    step_scale_factor: Option<Decimal>,
    adverse_only: bool,
}

impl EntryGate {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            min_entry_spacing: config.min_entry_spacing,
            step_scale_factor: config.scale_steps.then_some(config.price_step_scale_factor),
            adverse_only: config.adverse_only,
        }
    }

    /// Spacing required before the entry that would follow `entry_count` fills.
    pub fn effective_step(&self, entry_count: u32) -> Decimal {
        match self.step_scale_factor {
            Some(factor) => scaled(self.min_entry_spacing, factor, entry_count),
            None => self.min_entry_spacing,
        }
    }

    pub fn can_enter(&self, basket: &Basket, current_price: Decimal) -> bool {
        if basket.entry_count() >= self.max_entries {
            return false;
        }
        let Some(last_price) = basket.last_fill_price() else {
            return true;
        };

        let step = self.effective_step(basket.entry_count());
        if (current_price - last_price).abs() < step {
            return false;
        }
        if self.adverse_only && basket.direction().excursion(last_price, current_price) >= Decimal::ZERO {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::BasketTracker;
    use crate::domain::Direction;
    use rust_decimal_macros::dec;

    fn tracker_with(direction: Direction, prices: &[Decimal]) -> BasketTracker {
        let mut tracker = BasketTracker::new(direction);
        for price in prices {
            tracker.record_fill(dec!(1), *price).unwrap();
        }
        tracker
    }

    #[test]
    fn first_entry_always_allowed() {
        let gate = EntryGate::new(&EngineConfig::new(dec!(1), 1, dec!(1000), dec!(5)));
        assert!(gate.can_enter(&Basket::empty(Direction::Long), dec!(1)));
    }

    #[test]
    fn denies_at_max_entries() {
        let gate = EntryGate::new(&EngineConfig::new(dec!(1), 2, dec!(10), dec!(5)));
        let tracker = tracker_with(Direction::Long, &[dec!(100), dec!(89)]);
        assert!(!gate.can_enter(tracker.basket(), dec!(10)));
    }

    #[test]
    fn requires_minimum_spacing() {
        let gate = EntryGate::new(&EngineConfig::new(dec!(1), 3, dec!(10), dec!(5)));
        let tracker = tracker_with(Direction::Long, &[dec!(100)]);
        assert!(!gate.can_enter(tracker.basket(), dec!(91)));
        assert!(gate.can_enter(tracker.basket(), dec!(90)));
        // Distance is absolute unless adverse_only is set.
        assert!(gate.can_enter(tracker.basket(), dec!(110)));
    }

    #[test]
    fn scaled_steps_widen_with_each_entry() {
        let cfg = EngineConfig::new(dec!(1), 5, dec!(10), dec!(5)).with_step_scale(dec!(1.5));
        let gate = EntryGate::new(&cfg);
        assert_eq!(gate.effective_step(1), dec!(15));
        assert_eq!(gate.effective_step(2), dec!(22.5));

        let tracker = tracker_with(Direction::Long, &[dec!(100), dec!(85)]);
        assert!(!gate.can_enter(tracker.basket(), dec!(63)));
        assert!(gate.can_enter(tracker.basket(), dec!(62.5)));
    }

    #[test]
    fn unscaled_step_is_constant() {
        let gate = EntryGate::new(&EngineConfig::new(dec!(1), 5, dec!(10), dec!(5)));
        assert_eq!(gate.effective_step(0), dec!(10));
        assert_eq!(gate.effective_step(4), dec!(10));
    }

    #[test]
    fn adverse_only_blocks_favorable_adds() {
        let cfg = EngineConfig::new(dec!(1), 3, dec!(10), dec!(5)).with_adverse_only(true);
        let gate = EntryGate::new(&cfg);

        let long = tracker_with(Direction::Long, &[dec!(100)]);
        assert!(!gate.can_enter(long.basket(), dec!(110)));
        assert!(gate.can_enter(long.basket(), dec!(90)));

        let short = tracker_with(Direction::Short, &[dec!(100)]);
        assert!(gate.can_enter(short.basket(), dec!(110)));
        assert!(!gate.can_enter(short.basket(), dec!(90)));
    }
}
