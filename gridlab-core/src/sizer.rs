//! VolumeSizer: volume of the next basket entry.
//!
//! # Formula
//! ```text
//! raw      = base_volume * volume_scale_factor ^ entry_count
//! capped   = min(raw, max_order_volume, max_basket_volume - total_volume)
//! volume   = exchange rounding of capped (floor to step, raise to min, cap at max)
//! ```
//!
//! A zero result means "no entry possible" (no headroom, or nothing left after flooring).

use crate::basket::Basket;
use crate::config::EngineConfig;
use crate::domain::ExchangeConstraints;
use rust_decimal::Decimal;

/// `value * factor ^ exponent` by repeated checked multiplication, saturating at `Decimal::MAX`.
pub(crate) fn scaled(value: Decimal, factor: Decimal, exponent: u32) -> Decimal {
    let mut out = value;
    for _ in 0..exponent {
        match out.checked_mul(factor) {
            Some(next) => out = next,
            None => return Decimal::MAX,
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct VolumeSizer {
    base_volume: Decimal,
    scale_factor: Decimal,
    max_order_volume: Option<Decimal>,
    max_basket_volume: Option<Decimal>,
    constraints: ExchangeConstraints,
}

impl VolumeSizer {
    pub fn new(config: &EngineConfig, constraints: &ExchangeConstraints) -> Self {
        Self {
            base_volume: config.base_volume,
            scale_factor: config.volume_scale_factor,
            max_order_volume: config.max_order_volume,
            max_basket_volume: config.max_basket_volume,
            constraints: constraints.clone(),
        }
    }

    /// Volume for the entry that would follow the basket's current fills.
    pub fn next_volume(&self, basket: &Basket) -> Decimal {
        let mut volume = scaled(self.base_volume, self.scale_factor, basket.entry_count());

        if let Some(cap) = self.max_order_volume {
            volume = volume.min(cap);
        }
        if let Some(cap) = self.max_basket_volume {
            let headroom = cap - basket.total_volume();
            if headroom <= Decimal::ZERO {
                return Decimal::ZERO;
            }
            volume = volume.min(headroom);
        }

        self.constraints.round_volume(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basket::BasketTracker;
    use crate::domain::Direction;
    use rust_decimal_macros::dec;

    fn config() -> EngineConfig {
        EngineConfig::new(dec!(1), 5, dec!(10), dec!(5)).with_volume_scale(dec!(2))
    }

    fn lots(step: Decimal) -> ExchangeConstraints {
        ExchangeConstraints {
            volume_step: step,
            min_volume: step,
            max_volume: dec!(1000),
            price_step: dec!(0.01),
        }
    }

    #[test]
    fn first_entry_uses_base_volume() {
        let sizer = VolumeSizer::new(&config(), &lots(dec!(0.01)));
        let basket = Basket::empty(Direction::Long);
        assert_eq!(sizer.next_volume(&basket), dec!(1));
    }

    #[test]
    fn volume_doubles_per_existing_entry() {
        let sizer = VolumeSizer::new(&config(), &lots(dec!(0.01)));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        assert_eq!(sizer.next_volume(tracker.basket()), dec!(2));
        tracker.record_fill(dec!(2), dec!(89)).unwrap();
        assert_eq!(sizer.next_volume(tracker.basket()), dec!(4));
    }

    #[test]
    fn per_order_cap_reduces_volume() {
        let cfg = config().with_volume_caps(Some(dec!(3)), None);
        let sizer = VolumeSizer::new(&cfg, &lots(dec!(0.01)));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        tracker.record_fill(dec!(2), dec!(90)).unwrap();
        assert_eq!(sizer.next_volume(tracker.basket()), dec!(3));
    }

    #[test]
    fn basket_cap_reduces_to_headroom() {
        let cfg = config().with_volume_caps(None, Some(dec!(4.5)));
        let sizer = VolumeSizer::new(&cfg, &lots(dec!(0.01)));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        tracker.record_fill(dec!(2), dec!(90)).unwrap();
        assert_eq!(sizer.next_volume(tracker.basket()), dec!(1.5));
    }

    #[test]
    fn exhausted_headroom_means_no_entry() {
        let cfg = config().with_volume_caps(None, Some(dec!(3)));
        let sizer = VolumeSizer::new(&cfg, &lots(dec!(0.01)));
        let mut tracker = BasketTracker::new(Direction::Long);
        tracker.record_fill(dec!(1), dec!(100)).unwrap();
        tracker.record_fill(dec!(2), dec!(90)).unwrap();
        assert_eq!(sizer.next_volume(tracker.basket()), Decimal::ZERO);
    }

    #[test]
    fn sub_step_volume_rounds_to_zero() {
        let cfg = EngineConfig::new(dec!(0.4), 3, dec!(1), dec!(1));
        let sizer = VolumeSizer::new(&cfg, &lots(dec!(1)));
        assert_eq!(sizer.next_volume(&Basket::empty(Direction::Short)), Decimal::ZERO);
    }

    #[test]
    fn deep_ladder_without_caps_saturates_to_exchange_max() {
        let cfg = EngineConfig::new(dec!(1), 64, dec!(0), dec!(5)).with_volume_scale(dec!(10));
        let constraints = ExchangeConstraints::unconstrained();
        let sizer = VolumeSizer::new(&cfg, &constraints);
        let mut tracker = BasketTracker::new(Direction::Long);
        for _ in 0..40 {
            tracker.record_fill(dec!(1), dec!(100)).unwrap();
        }
        // 10^40 saturates to Decimal::MAX before exchange rounding.
        assert_eq!(sizer.next_volume(tracker.basket()), constraints.max_volume);
    }

    #[test]
    fn scaled_saturates_on_overflow() {
        assert_eq!(scaled(dec!(1), dec!(1000000), 40), Decimal::MAX);
        assert_eq!(scaled(dec!(3), dec!(1.5), 2), dec!(6.75));
        assert_eq!(scaled(dec!(3), dec!(7), 0), dec!(3));
    }
}
