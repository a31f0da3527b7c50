//! Error and degradation types.
//!
//! Only configuration mistakes and broken basket invariants are errors. Out-of-order or
//! duplicate events from the order layer are `SequenceViolation`s: logged, dropped, and
//! reported back as an outcome so callers can count them.

use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid engine or exchange configuration. Raised at construction, never clamped.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("max_entries must be at least 1, got {0}")]
    MaxEntries(u32),

    #[error("min_volume {min} exceeds max_volume {max}")]
    VolumeBounds { min: Decimal, max: Decimal },

    #[error("{field} {value} is not a multiple of volume_step {step}")]
    OffStep {
        field: &'static str,
        value: Decimal,
        step: Decimal,
    },

    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(String),
}

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Basket bookkeeping disagrees with itself. Indicates a caller defect, not a market event.
    #[error("basket invariant broken: {0}")]
    InvariantBroken(String),
}

/// An order-layer event that does not fit the engine's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum SequenceViolation {
    #[error("fill confirmation received while flat")]
    FillWhileFlat,

    #[error("flatten confirmation received after the basket was already reset")]
    DuplicateFlatten,

    #[error("flatten confirmation received while no flatten was requested")]
    UnexpectedFlatten,

    #[error("entry fill received with no outstanding entry intent")]
    UnsolicitedFill,

    #[error("fill confirmation with non-positive volume or price")]
    InvalidFill,

    #[error("entry rejection received with no outstanding entry intent")]
    UnexpectedRejection,
}
