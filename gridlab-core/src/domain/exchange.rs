//! Exchange trading constraints: volume step, volume bounds, price tick.

use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-symbol constraints, read once at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConstraints {
    pub volume_step: Decimal,
    pub min_volume: Decimal,
    pub max_volume: Decimal,
    pub price_step: Decimal,
}

impl ExchangeConstraints {
    /// Constraints that never bind: unit steps down to 1e-8 and an effectively unbounded maximum.
    pub fn unconstrained() -> Self {
        let step = Decimal::new(1, 8);
        Self {
            volume_step: step,
            min_volume: step,
            max_volume: Decimal::from(1_000_000_000u64),
            price_step: step,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("volume_step", self.volume_step),
            ("min_volume", self.min_volume),
            ("max_volume", self.max_volume),
            ("price_step", self.price_step),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.min_volume > self.max_volume {
            return Err(ConfigError::VolumeBounds {
                min: self.min_volume,
                max: self.max_volume,
            });
        }
        for (field, value) in [("min_volume", self.min_volume), ("max_volume", self.max_volume)] {
            if !(value % self.volume_step).is_zero() {
                return Err(ConfigError::OffStep {
                    field,
                    value,
                    step: self.volume_step,
                });
            }
        }
        Ok(())
    }

    /// Apply exchange rounding to a sized volume.
    ///
    /// Floors to a `volume_step` multiple, raises to `min_volume`, caps at `max_volume`.
    /// Returns zero when flooring leaves nothing to trade.
    ///
    /// Caps before dividing by the step, so a saturated `Decimal::MAX` cannot overflow.
    pub fn round_volume(&self, volume: Decimal) -> Decimal {
        let capped = volume.min(self.max_volume);
        let floored = (capped / self.volume_step).floor() * self.volume_step;
        if floored <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        floored.max(self.min_volume).min(self.max_volume).normalize()
    }

    /// Round a price to the nearest `price_step` multiple.
    pub fn round_price(&self, price: Decimal) -> Decimal {
        ((price / self.price_step).round() * self.price_step).normalize()
    }
}

impl Default for ExchangeConstraints {
    fn default() -> Self {
        Self::unconstrained()
    }
}
