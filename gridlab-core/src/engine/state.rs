//! Engine lifecycle state and per-call outcomes.

use crate::domain::{EntryIntent, Fill, FlattenIntent};
use crate::error::SequenceViolation;
use crate::exit::ExitDecision;
use rust_decimal::Decimal;
use serde::Serialize;

/// `Flat → Accumulating → (Accumulating | Flattening) → Flat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// No basket and no entry in flight.
    Flat,
    /// Basket open, or its first entry in flight.
    Accumulating,
    /// Flatten intent emitted; waiting for its confirmation.
    Flattening,
}

/// Why a sample was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Non-positive prices, high below low, or close outside the range.
    InvalidSample,
    /// Timestamp earlier than the previous sample.
    NonMonotonicTimestamp,
}

/// Result of `Engine::on_price_sample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleOutcome {
    /// Nothing to send to the order layer.
    Idle,
    Entry(EntryIntent),
    Flatten {
        intent: FlattenIntent,
        reason: ExitDecision,
    },
    Skipped(SkipReason),
}

impl SampleOutcome {
    pub fn exit_reason(&self) -> Option<ExitDecision> {
        match self {
            SampleOutcome::Flatten { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Result of `Engine::on_fill_confirmed` and `Engine::on_entry_rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillOutcome {
    /// Entry fill appended to the basket.
    Recorded(Fill),
    /// Flatten confirmed; the basket was reset.
    Flattened {
        reason: Option<ExitDecision>,
        volume: Decimal,
        price: Decimal,
    },
    /// Outstanding entry withdrawn by the order layer.
    EntryCancelled,
    /// Event did not fit the current state; state unchanged.
    Dropped(SequenceViolation),
}
