//! Engine: composition root for one direction slot.
//!
//! The surrounding strategy drives it through two entry points:
//!
//! 1. `on_price_sample`: update extreme and risk levels, decide exits, decide layered entries
//! 2. `on_fill_confirmed` (and `on_entry_rejected`): advance the basket from real executions
//!
//! Basket volume and entry count only ever move on confirmed fills, never on intent emission.
//! At most one entry intent is in flight at a time; while it is, no further entry or flatten
//! is emitted.

pub mod state;

pub use state::{EngineState, FillOutcome, SampleOutcome, SkipReason};

use crate::basket::{Basket, BasketTracker};
use crate::config::EngineConfig;
use crate::domain::{
    Direction, EntryIntent, EntrySignal, ExchangeConstraints, FillConfirmation, FlattenIntent,
    PriceSample,
};
use crate::error::{EngineError, SequenceViolation};
use crate::exit::{ExitDecider, ExitDecision};
use crate::gate::EntryGate;
use crate::risk::{RiskCalculator, RiskLevels};
use crate::sizer::VolumeSizer;
use crate::trailing::TrailingLock;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub struct Engine {
    direction: Direction,
    config: EngineConfig,

    sizer: VolumeSizer,
    gate: EntryGate,
    risk: RiskCalculator,

    tracker: BasketTracker,
    trailing: TrailingLock,
    levels: RiskLevels,

    state: EngineState,
    pending_entry: Option<EntryIntent>,
    exit_reason: Option<ExitDecision>,
    /// Set after a flatten resets the basket, until the next entry; distinguishes duplicate
    /// flatten acks from stray fills.
    just_flattened: bool,
    last_timestamp: Option<DateTime<Utc>>,

    span: tracing::Span,
}

impl Engine {
    pub fn new(
        direction: Direction,
        config: EngineConfig,
        constraints: ExchangeConstraints,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        constraints.validate()?;

        let fingerprint = config.fingerprint();
        let span = tracing::info_span!(
            "grid_engine",
            direction = %direction,
            config = &fingerprint[..12],
        );

        let tracker = BasketTracker::new(direction);
        let trailing = TrailingLock::new(tracker.basket(), &config, &constraints);

        Ok(Self {
            direction,
            sizer: VolumeSizer::new(&config, &constraints),
            gate: EntryGate::new(&config),
            risk: RiskCalculator::new(&config, &constraints),
            tracker,
            trailing,
            levels: RiskLevels::default(),
            state: EngineState::Flat,
            pending_entry: None,
            exit_reason: None,
            just_flattened: false,
            last_timestamp: None,
            config,
            span,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn basket(&self) -> &Basket {
        self.tracker.basket()
    }

    pub fn risk_levels(&self) -> &RiskLevels {
        &self.levels
    }

    pub fn pending_entry(&self) -> Option<&EntryIntent> {
        self.pending_entry.as_ref()
    }

    /// Process one price sample. `signal` is only consulted to open a basket from `Flat`.
    pub fn on_price_sample(&mut self, sample: &PriceSample, signal: EntrySignal) -> SampleOutcome {
        let span = self.span.clone();
        let _enter = span.enter();

        if !sample.is_sane() {
            warn!(
                high = %sample.high,
                low = %sample.low,
                close = %sample.close,
                "skipping invalid price sample"
            );
            return SampleOutcome::Skipped(SkipReason::InvalidSample);
        }
        if let Some(last) = self.last_timestamp {
            if sample.timestamp < last {
                warn!(timestamp = %sample.timestamp, previous = %last, "skipping out-of-order sample");
                return SampleOutcome::Skipped(SkipReason::NonMonotonicTimestamp);
            }
        }
        self.last_timestamp = Some(sample.timestamp);

        match self.state {
            EngineState::Flat => match signal {
                EntrySignal::Enter => self.try_enter(sample.close),
                EntrySignal::Hold => SampleOutcome::Idle,
            },
            EngineState::Flattening => {
                self.tracker.update_extreme(sample.high, sample.low);
                SampleOutcome::Idle
            }
            EngineState::Accumulating => self.accumulate(sample),
        }
    }

    fn accumulate(&mut self, sample: &PriceSample) -> SampleOutcome {
        if self.tracker.basket().is_empty() {
            // First entry still in flight.
            return SampleOutcome::Idle;
        }

        self.tracker.update_extreme(sample.high, sample.low);
        self.levels.trailing_stop_price = self.trailing.update(self.tracker.basket(), sample.close);

        if self.pending_entry.is_some() {
            return SampleOutcome::Idle;
        }

        let decision =
            ExitDecider::evaluate(self.tracker.basket(), sample.high, sample.low, &self.levels);
        if decision.is_exit() {
            let intent = FlattenIntent {
                volume: self.tracker.basket().total_volume(),
            };
            info!(
                reason = ?decision,
                volume = %intent.volume,
                average = %self.tracker.basket().average_price(),
                entries = self.tracker.basket().entry_count(),
                "flattening basket"
            );
            self.state = EngineState::Flattening;
            self.exit_reason = Some(decision);
            return SampleOutcome::Flatten {
                intent,
                reason: decision,
            };
        }

        self.try_enter(sample.close)
    }

    fn try_enter(&mut self, price: Decimal) -> SampleOutcome {
        if !self.gate.can_enter(self.tracker.basket(), price) {
            return SampleOutcome::Idle;
        }
        let volume = self.sizer.next_volume(self.tracker.basket());
        if volume.is_zero() {
            debug!(
                entries = self.tracker.basket().entry_count(),
                "sized volume is zero after caps and rounding, no entry"
            );
            return SampleOutcome::Idle;
        }

        let intent = EntryIntent {
            direction: self.direction,
            volume,
        };
        if self.state == EngineState::Flat {
            info!(price = %price, volume = %volume, "opening basket");
            self.state = EngineState::Accumulating;
            self.just_flattened = false;
        } else {
            debug!(
                price = %price,
                volume = %volume,
                entry = self.tracker.basket().entry_count(),
                "layered entry"
            );
        }
        self.pending_entry = Some(intent);
        SampleOutcome::Entry(intent)
    }

    /// Apply an execution report from the order layer.
    ///
    /// Out-of-sequence reports are logged and dropped. Only a broken basket invariant is an error.
    pub fn on_fill_confirmed(&mut self, fill: &FillConfirmation) -> Result<FillOutcome, EngineError> {
        let span = self.span.clone();
        let _enter = span.enter();

        let violation = match (self.state, fill.is_flatten) {
            (EngineState::Flat, true) if self.just_flattened => Some(SequenceViolation::DuplicateFlatten),
            (EngineState::Flat, _) => Some(SequenceViolation::FillWhileFlat),
            (EngineState::Accumulating, true) => Some(SequenceViolation::UnexpectedFlatten),
            (EngineState::Accumulating, false) if self.pending_entry.is_none() => {
                Some(SequenceViolation::UnsolicitedFill)
            }
            (EngineState::Flattening, false) => Some(SequenceViolation::UnsolicitedFill),
            _ if !fill.is_well_formed() => Some(SequenceViolation::InvalidFill),
            _ => None,
        };
        if let Some(violation) = violation {
            return Ok(self.drop_event(violation, fill));
        }

        if fill.is_flatten {
            Ok(self.complete_flatten(fill))
        } else {
            self.record_entry(fill)
        }
    }

    fn record_entry(&mut self, fill: &FillConfirmation) -> Result<FillOutcome, EngineError> {
        if let Some(intent) = self.pending_entry.take() {
            if intent.volume != fill.volume {
                warn!(
                    requested = %intent.volume,
                    filled = %fill.volume,
                    "entry filled with a different volume than requested"
                );
            }
        }

        let recorded = self.tracker.record_fill(fill.volume, fill.price)?;
        self.levels = self.risk.recompute(self.tracker.basket(), &self.levels);

        let basket = self.tracker.basket();
        debug!(
            price = %recorded.price,
            volume = %recorded.volume,
            average = %basket.average_price(),
            total_volume = %basket.total_volume(),
            take_profit = ?self.levels.take_profit_price,
            stop = ?self.levels.stop_price,
            "entry fill recorded"
        );
        Ok(FillOutcome::Recorded(recorded))
    }

    fn complete_flatten(&mut self, fill: &FillConfirmation) -> FillOutcome {
        let basket = self.tracker.basket();
        if fill.volume != basket.total_volume() {
            warn!(
                basket_volume = %basket.total_volume(),
                confirmed = %fill.volume,
                "flatten confirmed with a volume different from the basket"
            );
        }
        info!(
            price = %fill.price,
            pnl = %basket.unrealized_pnl(fill.price),
            entries = basket.entry_count(),
            "basket closed"
        );

        self.tracker.reset();
        self.trailing.clear();
        self.levels = RiskLevels::default();
        self.state = EngineState::Flat;
        self.just_flattened = true;

        FillOutcome::Flattened {
            reason: self.exit_reason.take(),
            volume: fill.volume,
            price: fill.price,
        }
    }

    /// The order layer refused or cancelled the outstanding entry intent.
    pub fn on_entry_rejected(&mut self) -> FillOutcome {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(intent) = self.pending_entry.take() else {
            warn!(violation = %SequenceViolation::UnexpectedRejection, "dropping entry rejection");
            return FillOutcome::Dropped(SequenceViolation::UnexpectedRejection);
        };

        debug!(volume = %intent.volume, "entry rejected");
        if self.tracker.basket().is_empty() {
            self.state = EngineState::Flat;
        }
        FillOutcome::EntryCancelled
    }

    fn drop_event(&self, violation: SequenceViolation, fill: &FillConfirmation) -> FillOutcome {
        warn!(
            %violation,
            state = ?self.state,
            volume = %fill.volume,
            price = %fill.price,
            is_flatten = fill.is_flatten,
            "dropping fill confirmation"
        );
        FillOutcome::Dropped(violation)
    }
}
