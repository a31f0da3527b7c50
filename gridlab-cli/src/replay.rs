//! Replay recorded samples through one engine with a simulated market-order layer.
//!
//! Every intent is confirmed immediately at the close of the sample that produced it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gridlab_core::{
    Basket, Direction, Engine, EngineProfile, EntrySignal, ExitDecision, FillConfirmation,
    FillOutcome, PriceSample, SampleOutcome,
};
use rust_decimal::Decimal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One CSV row: `timestamp,high,low,close`.
#[derive(Debug, Deserialize)]
struct SampleRow {
    timestamp: DateTime<Utc>,
    high: Decimal,
    low: Decimal,
    close: Decimal,
}

pub fn load_samples(path: &Path) -> Result<Vec<PriceSample>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open samples file {}", path.display()))?;
    let mut samples = Vec::new();
    for (i, row) in reader.deserialize::<SampleRow>().enumerate() {
        let row = row.with_context(|| format!("parse sample row {}", i + 1))?;
        samples.push(PriceSample::new(row.timestamp, row.high, row.low, row.close));
    }
    Ok(samples)
}

/// Stand-in for an external entry-signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SignalMode {
    /// Re-open a basket whenever flat.
    Always,
    /// Open only the first basket.
    Once,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasketReport {
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub entries: u32,
    pub total_volume: Decimal,
    pub average_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub exit_reason: Option<ExitDecision>,
    pub realized_pnl: Option<Decimal>,
}

impl BasketReport {
    fn open(basket: &Basket, opened_at: DateTime<Utc>) -> Self {
        Self {
            opened_at,
            closed_at: None,
            entries: basket.entry_count(),
            total_volume: basket.total_volume(),
            average_price: basket.average_price(),
            exit_price: None,
            exit_reason: None,
            realized_pnl: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub fingerprint: String,
    pub direction: Direction,
    pub samples: usize,
    pub skipped_samples: usize,
    pub dropped_events: usize,
    pub baskets: Vec<BasketReport>,
    pub open_basket: Option<BasketReport>,
    pub realized_pnl: Decimal,
}

pub fn replay(
    profile: &EngineProfile,
    samples: &[PriceSample],
    mode: SignalMode,
) -> Result<ReplayReport> {
    let mut engine = Engine::new(
        profile.direction,
        profile.engine.clone(),
        profile.exchange.clone(),
    )?;

    let mut report = ReplayReport {
        fingerprint: profile.engine.fingerprint(),
        direction: profile.direction,
        samples: samples.len(),
        skipped_samples: 0,
        dropped_events: 0,
        baskets: Vec::new(),
        open_basket: None,
        realized_pnl: Decimal::ZERO,
    };
    let mut opened_at: Option<DateTime<Utc>> = None;

    for sample in samples {
        let signal = match mode {
            SignalMode::Always => EntrySignal::Enter,
            SignalMode::Once if report.baskets.is_empty() => EntrySignal::Enter,
            SignalMode::Once => EntrySignal::Hold,
        };

        let outcome = match engine.on_price_sample(sample, signal) {
            SampleOutcome::Skipped(_) => {
                report.skipped_samples += 1;
                continue;
            }
            SampleOutcome::Idle => continue,
            SampleOutcome::Entry(entry) => {
                opened_at.get_or_insert(sample.timestamp);
                engine.on_fill_confirmed(&FillConfirmation::entry(entry.volume, sample.close))?
            }
            SampleOutcome::Flatten { intent, reason } => {
                let mut basket = BasketReport::open(
                    engine.basket(),
                    opened_at.take().unwrap_or(sample.timestamp),
                );
                let pnl = engine.basket().unrealized_pnl(sample.close);
                basket.closed_at = Some(sample.timestamp);
                basket.exit_price = Some(sample.close);
                basket.exit_reason = Some(reason);
                basket.realized_pnl = Some(pnl);
                report.realized_pnl += pnl;
                report.baskets.push(basket);

                engine.on_fill_confirmed(&FillConfirmation::flatten(intent.volume, sample.close))?
            }
        };
        if let FillOutcome::Dropped(violation) = outcome {
            tracing::warn!(%violation, "simulated order layer event dropped");
            report.dropped_events += 1;
        }
    }

    if !engine.basket().is_empty() {
        report.open_basket = opened_at.map(|at| BasketReport::open(engine.basket(), at));
    }
    Ok(report)
}

/// Replay the same samples under several profiles in parallel.
///
/// Reports come back in profile order.
pub fn replay_all(
    profiles: &[EngineProfile],
    samples: &[PriceSample],
    mode: SignalMode,
) -> Result<Vec<ReplayReport>> {
    profiles
        .par_iter()
        .map(|profile| replay(profile, samples, mode))
        .collect()
}

pub fn print_text(report: &ReplayReport) {
    println!("config      {}", &report.fingerprint[..12]);
    println!("direction   {}", report.direction);
    println!(
        "samples     {} ({} skipped, {} dropped events)",
        report.samples, report.skipped_samples, report.dropped_events
    );
    println!();
    for (i, b) in report.baskets.iter().enumerate() {
        println!(
            "#{:<3} {} entries  vol {}  avg {}  exit {} ({:?})  pnl {}",
            i + 1,
            b.entries,
            b.total_volume,
            b.average_price.round_dp(4),
            b.exit_price.unwrap_or_default(),
            b.exit_reason.unwrap_or(ExitDecision::None),
            b.realized_pnl.unwrap_or_default().round_dp(4),
        );
    }
    if let Some(b) = &report.open_basket {
        println!(
            "open  {} entries  vol {}  avg {}",
            b.entries,
            b.total_volume,
            b.average_price.round_dp(4)
        );
    }
    println!();
    println!("realized pnl {}", report.realized_pnl.round_dp(4));
}
