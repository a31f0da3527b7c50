//! GridLab Core: layered position accumulation and basket exits.
//!
//! One `Engine` per traded direction slot. It opens a basket on an external entry signal,
//! layers further entries as price moves by the configured spacing, keeps a volume-weighted
//! average price, and flattens the whole basket on take-profit, trailing lock, or stop.
//!
//! - `domain`: samples, fills, intents, direction, exchange constraints
//! - `basket`: fill bookkeeping and the volume/entry-count invariant
//! - `sizer` / `gate`: how much and whether to add
//! - `risk` / `trailing` / `ratchet` / `exit`: when to get out
//! - `engine`: state machine wiring the above
//!
//! Indicators, entry signals and order transport live outside this crate.

pub mod basket;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod exit;
pub mod gate;
pub mod ratchet;
pub mod risk;
pub mod sizer;
pub mod trailing;

pub use basket::{Basket, BasketTracker};
pub use config::{EngineConfig, EngineProfile, TakeProfitPolicy};
pub use domain::{
    Direction, EntryIntent, EntrySignal, ExchangeConstraints, Fill, FillConfirmation,
    FlattenIntent, PriceSample,
};
pub use engine::{Engine, EngineState, FillOutcome, SampleOutcome, SkipReason};
pub use error::{ConfigError, EngineError, SequenceViolation};
pub use exit::{ExitDecider, ExitDecision};
pub use gate::EntryGate;
pub use risk::{RiskCalculator, RiskLevels};
pub use sizer::VolumeSizer;
pub use trailing::TrailingLock;
