//! GridLab CLI: replay and config-check commands.
//!
//! Commands:
//! - `replay`: run recorded price samples through the grid engine with immediate fills
//! - `compare`: replay one sample file under several profiles in parallel
//! - `check-config`: validate an engine profile and print its fingerprint

mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridlab_core::EngineProfile;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::replay::SignalMode;

#[derive(Parser)]
#[command(
    name = "gridlab",
    about = "GridLab CLI: layered basket accumulation engine"
)]
struct Cli {
    /// Default log filter when RUST_LOG is unset (e.g. info, debug, gridlab_core=trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV of samples (timestamp,high,low,close) through the engine.
    Replay {
        /// Path to a TOML engine profile.
        #[arg(long)]
        config: PathBuf,

        /// Path to the samples CSV.
        #[arg(long)]
        samples: PathBuf,

        /// Entry signal stand-in.
        #[arg(long, value_enum, default_value_t = SignalMode::Always)]
        signal: SignalMode,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay one sample file under several profiles and rank them by realized PnL.
    Compare {
        /// TOML engine profiles; repeat the flag for each.
        #[arg(long = "config", required = true)]
        configs: Vec<PathBuf>,

        #[arg(long)]
        samples: PathBuf,

        #[arg(long, value_enum, default_value_t = SignalMode::Always)]
        signal: SignalMode,
    },
    /// Validate a TOML engine profile.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Commands::Replay {
            config,
            samples,
            signal,
            json,
        } => run_replay(&config, &samples, signal, json),
        Commands::Compare {
            configs,
            samples,
            signal,
        } => run_compare(&configs, &samples, signal),
        Commands::CheckConfig { config } => run_check_config(&config),
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter {level:?}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load_profile(path: &Path) -> Result<EngineProfile> {
    EngineProfile::from_file(path).with_context(|| format!("load profile {}", path.display()))
}

fn run_replay(config: &Path, samples: &Path, signal: SignalMode, json: bool) -> Result<()> {
    let profile = load_profile(config)?;
    let samples = replay::load_samples(samples)?;
    info!(samples = samples.len(), direction = %profile.direction, "starting replay");

    let report = replay::replay(&profile, &samples, signal)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        replay::print_text(&report);
    }
    Ok(())
}

fn run_compare(configs: &[PathBuf], samples: &Path, signal: SignalMode) -> Result<()> {
    let profiles = configs
        .iter()
        .map(|path| load_profile(path))
        .collect::<Result<Vec<_>>>()?;
    let samples = replay::load_samples(samples)?;
    info!(profiles = profiles.len(), samples = samples.len(), "starting compare");

    let reports = replay::replay_all(&profiles, &samples, signal)?;
    let mut ranked: Vec<_> = configs.iter().zip(&reports).collect();
    ranked.sort_by(|a, b| b.1.realized_pnl.cmp(&a.1.realized_pnl));

    println!("{:<4} {:<12} {:>8} {:>14}  profile", "rank", "config", "baskets", "realized pnl");
    for (rank, (path, report)) in ranked.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:>8} {:>14}  {}",
            rank + 1,
            &report.fingerprint[..12],
            report.baskets.len(),
            report.realized_pnl.round_dp(4),
            path.display()
        );
    }
    Ok(())
}

fn run_check_config(config: &Path) -> Result<()> {
    let profile = load_profile(config)?;
    println!("ok          {}", config.display());
    println!("direction   {}", profile.direction);
    println!("fingerprint {}", profile.engine.fingerprint());
    Ok(())
}
