//! Engine configuration: immutable once an engine is built.
//!
//! Loaded from TOML in the surrounding tooling:
//!
//! ```toml
//! direction = "long"
//!
//! [engine]
//! base_volume = "1"
//! volume_scale_factor = "2"
//! max_entries = 3
//! min_entry_spacing = "10"
//! take_profit_distance = "5"
//!
//! [exchange]
//! volume_step = "0.01"
//! min_volume = "0.01"
//! max_volume = "100"
//! price_step = "0.01"
//! ```

use crate::domain::{Direction, ExchangeConstraints};
use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the take-profit level reacts when a layered entry moves the average price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TakeProfitPolicy {
    /// Target = average price + `take_profit_distance`, rebuilt after every fill.
    #[default]
    Recompute,
    /// Target fixed from the first fill, then shifted by `increment` per layered entry.
    ///
    /// `increment` is applied toward profit; use a negative value to pull the target in.
    FixedIncrement { increment: Decimal },
}

fn one() -> Decimal {
    Decimal::ONE
}

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Volume of the initial entry.
    pub base_volume: Decimal,
    /// Multiplier applied per existing entry when sizing the next one.
    #[serde(default = "one")]
    pub volume_scale_factor: Decimal,
    /// Multiplier applied per existing entry to the required spacing, when `scale_steps` is set.
    #[serde(default = "one")]
    pub price_step_scale_factor: Decimal,
    #[serde(default)]
    pub scale_steps: bool,
    pub max_entries: u32,
    /// Minimum distance from the last fill price before another entry is allowed.
    pub min_entry_spacing: Decimal,
    /// Only add entries when price has moved against the basket.
    #[serde(default)]
    pub adverse_only: bool,
    pub take_profit_distance: Decimal,
    #[serde(default)]
    pub take_profit_policy: TakeProfitPolicy,
    #[serde(default)]
    pub stop_loss_distance: Option<Decimal>,
    #[serde(default)]
    pub trailing_distance: Option<Decimal>,
    #[serde(default)]
    pub trailing_activation_distance: Option<Decimal>,
    /// Cap on any single entry's volume.
    #[serde(default)]
    pub max_order_volume: Option<Decimal>,
    /// Cap on the basket's aggregate volume.
    #[serde(default)]
    pub max_basket_volume: Option<Decimal>,
}

impl EngineConfig {
    pub fn new(
        base_volume: Decimal,
        max_entries: u32,
        min_entry_spacing: Decimal,
        take_profit_distance: Decimal,
    ) -> Self {
        Self {
            base_volume,
            volume_scale_factor: Decimal::ONE,
            price_step_scale_factor: Decimal::ONE,
            scale_steps: false,
            max_entries,
            min_entry_spacing,
            adverse_only: false,
            take_profit_distance,
            take_profit_policy: TakeProfitPolicy::Recompute,
            stop_loss_distance: None,
            trailing_distance: None,
            trailing_activation_distance: None,
            max_order_volume: None,
            max_basket_volume: None,
        }
    }

    pub fn with_volume_scale(mut self, factor: Decimal) -> Self {
        self.volume_scale_factor = factor;
        self
    }

    /// Enable widening entry spacing by `factor` per existing entry.
    pub fn with_step_scale(mut self, factor: Decimal) -> Self {
        self.price_step_scale_factor = factor;
        self.scale_steps = true;
        self
    }

    pub fn with_stop_loss(mut self, distance: Decimal) -> Self {
        self.stop_loss_distance = Some(distance);
        self
    }

    pub fn with_trailing(mut self, distance: Decimal, activation: Option<Decimal>) -> Self {
        self.trailing_distance = Some(distance);
        self.trailing_activation_distance = activation;
        self
    }

    pub fn with_take_profit_policy(mut self, policy: TakeProfitPolicy) -> Self {
        self.take_profit_policy = policy;
        self
    }

    pub fn with_volume_caps(mut self, per_order: Option<Decimal>, basket: Option<Decimal>) -> Self {
        self.max_order_volume = per_order;
        self.max_basket_volume = basket;
        self
    }

    pub fn with_adverse_only(mut self, adverse_only: bool) -> Self {
        self.adverse_only = adverse_only;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("base_volume", Some(self.base_volume)),
            ("volume_scale_factor", Some(self.volume_scale_factor)),
            ("price_step_scale_factor", Some(self.price_step_scale_factor)),
            ("take_profit_distance", Some(self.take_profit_distance)),
            ("stop_loss_distance", self.stop_loss_distance),
            ("trailing_distance", self.trailing_distance),
            ("max_order_volume", self.max_order_volume),
            ("max_basket_volume", self.max_basket_volume),
        ];
        for (field, value) in positive {
            if let Some(value) = value {
                if value <= Decimal::ZERO {
                    return Err(ConfigError::NotPositive { field, value });
                }
            }
        }

        let non_negative = [
            ("min_entry_spacing", Some(self.min_entry_spacing)),
            ("trailing_activation_distance", self.trailing_activation_distance),
        ];
        for (field, value) in non_negative {
            if let Some(value) = value {
                if value < Decimal::ZERO {
                    return Err(ConfigError::Negative { field, value });
                }
            }
        }

        if self.max_entries < 1 {
            return Err(ConfigError::MaxEntries(self.max_entries));
        }
        Ok(())
    }

    /// Deterministic identity of this configuration (blake3 over canonical JSON).
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("EngineConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Everything needed to build one engine: direction slot, parameters, exchange constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineProfile {
    pub direction: Direction,
    pub engine: EngineConfig,
    #[serde(default)]
    pub exchange: ExchangeConstraints,
}

impl EngineProfile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a profile.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let profile: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.exchange.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> EngineConfig {
        EngineConfig::new(dec!(1), 3, dec!(10), dec!(5))
    }

    #[test]
    fn default_config_is_valid() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_base_volume() {
        let mut cfg = base();
        cfg.base_volume = Decimal::ZERO;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "base_volume", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_scale() {
        let cfg = base().with_volume_scale(dec!(-2));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "volume_scale_factor", .. })
        ));
        let cfg = base().with_step_scale(Decimal::ZERO);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "price_step_scale_factor", .. })
        ));
    }

    #[test]
    fn rejects_zero_max_entries() {
        let mut cfg = base();
        cfg.max_entries = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::MaxEntries(0))));
    }

    #[test]
    fn rejects_negative_spacing() {
        let mut cfg = base();
        cfg.min_entry_spacing = dec!(-1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative { field: "min_entry_spacing", .. })
        ));
    }

    #[test]
    fn fingerprint_tracks_parameters() {
        let a = base();
        let b = base().with_stop_loss(dec!(20));
        assert_eq!(a.fingerprint(), base().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn profile_parses_from_toml() {
        let toml = r#"
direction = "short"

[engine]
base_volume = "0.5"
volume_scale_factor = "1.5"
max_entries = 5
min_entry_spacing = "2.5"
take_profit_distance = "4"
trailing_distance = "1"

[engine.take_profit_policy]
type = "fixed_increment"
increment = "-0.5"

[exchange]
volume_step = "0.1"
min_volume = "0.1"
max_volume = "50"
price_step = "0.01"
"#;
        let profile = EngineProfile::from_toml(toml).unwrap();
        assert_eq!(profile.direction, Direction::Short);
        assert_eq!(profile.engine.base_volume, dec!(0.5));
        assert_eq!(profile.engine.max_entries, 5);
        assert_eq!(profile.engine.trailing_distance, Some(dec!(1)));
        assert_eq!(profile.engine.stop_loss_distance, None);
        assert_eq!(
            profile.engine.take_profit_policy,
            TakeProfitPolicy::FixedIncrement { increment: dec!(-0.5) }
        );
        assert_eq!(profile.exchange.volume_step, dec!(0.1));
    }

    #[test]
    fn profile_without_exchange_uses_unconstrained() {
        let toml = r#"
direction = "long"

[engine]
base_volume = "1"
max_entries = 1
min_entry_spacing = "0"
take_profit_distance = "1"
"#;
        let profile = EngineProfile::from_toml(toml).unwrap();
        assert_eq!(profile.exchange, ExchangeConstraints::unconstrained());
        assert_eq!(profile.engine.volume_scale_factor, Decimal::ONE);
        assert_eq!(profile.engine.take_profit_policy, TakeProfitPolicy::Recompute);
    }

    #[test]
    fn profile_validation_runs_on_load() {
        let toml = r#"
direction = "long"

[engine]
base_volume = "1"
max_entries = 0
min_entry_spacing = "0"
take_profit_distance = "1"
"#;
        assert!(matches!(
            EngineProfile::from_toml(toml),
            Err(ConfigError::MaxEntries(0))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            EngineProfile::from_toml("direction = ["),
            Err(ConfigError::Parse(_))
        ));
    }
}
