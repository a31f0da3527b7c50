//! TrailingLock: trailing protective level derived from the basket's favorable extreme.
//!
//! Arms once the favorable excursion from the average price exceeds the activation distance
//! (immediately when none is configured). Candidate = extreme ∓ trailing distance, fed through
//! a `RatchetState` so the stored level only tightens.

use crate::basket::Basket;
use crate::config::EngineConfig;
use crate::domain::ExchangeConstraints;
use crate::ratchet::RatchetState;
use rust_decimal::Decimal;

/// Trailing level of one basket. Disabled when `trailing_distance` is unset.
#[derive(Debug, Clone)]
pub struct TrailingLock {
    distance: Option<Decimal>,
    activation: Option<Decimal>,
    constraints: ExchangeConstraints,
    ratchet: RatchetState,
}

impl TrailingLock {
    /// Create an unarmed lock for the basket's direction.
    pub fn new(basket: &Basket, config: &EngineConfig, constraints: &ExchangeConstraints) -> Self {
        Self {
            distance: config.trailing_distance,
            activation: config.trailing_activation_distance,
            constraints: constraints.clone(),
            ratchet: RatchetState::new(basket.direction()),
        }
    }

    /// Current trailing level; `None` until armed.
    pub fn level(&self) -> Option<Decimal> {
        self.ratchet.current_level()
    }

    /// Feed one sample's price; returns the (possibly unchanged) trailing level.
    pub fn update(&mut self, basket: &Basket, current_price: Decimal) -> Option<Decimal> {
        let distance = self.distance?;
        if basket.is_empty() {
            return self.level();
        }

        if self.level().is_none() {
            let excursion = basket
                .direction()
                .excursion(basket.average_price(), current_price);
            let armed = match self.activation {
                Some(activation) => excursion > activation,
                None => true,
            };
            if !armed {
                return None;
            }
        }

        let candidate = basket
            .direction()
            .toward_loss(basket.extreme_price(), distance);
        let candidate = self.constraints.round_price(candidate);
        Some(self.ratchet.apply(candidate))
    }

    /// Disarm after the basket resets.
    pub fn clear(&mut self) {
        self.ratchet.clear();
    }
}
