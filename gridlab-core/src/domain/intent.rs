//! Intents emitted by the engine for the external order layer.
//!
//! The engine never fills anything itself. Basket state only advances when the order layer
//! reports back through `Engine::on_fill_confirmed` or `Engine::on_entry_rejected`.

use crate::domain::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Verdict of the external entry-signal generator for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntrySignal {
    /// Open a new basket if the engine is flat.
    Enter,
    #[default]
    Hold,
}

/// Market order adding `volume` to the basket in `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryIntent {
    pub direction: Direction,
    pub volume: Decimal,
}

/// Market order closing the whole basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenIntent {
    pub volume: Decimal,
}
