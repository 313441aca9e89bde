//! UrbanSense analytics CLI
//!
//! Runs the analytics engine over JSON exports from the sensor store and
//! prints the results as pretty JSON on stdout. Logs go to stderr.
//!
//! Inputs for `forecast`, `fill-forecast` and `anomalies` may be a single
//! chronological history (JSON array) or a batch keyed by station / bin id
//! (JSON object of arrays). Batches are processed in parallel.
//!
//! # Usage
//! ```bash
//! urbansense forecast --input station_042.json --horizon 24
//! urbansense route --input bins.json
//! urbansense --json-logs anomalies --kind fill --input fill_history.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use urbansense::config::{self, EngineConfig};
use urbansense::types::{AirQualityReading, BinReading, RouteCandidate};
use urbansense::AnalyticsEngine;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "urbansense")]
#[command(about = "UrbanSense urban environment analytics")]
#[command(version)]
struct Args {
    /// Engine config TOML (default search: $URBANSENSE_CONFIG, ./urbansense.toml)
    #[arg(long, global = true, env = "URBANSENSE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Multi-step air-quality forecast
    Forecast {
        #[arg(short, long)]
        input: PathBuf,
        /// Steps ahead (hours at the default step size)
        #[arg(long, default_value = "24")]
        horizon: usize,
    },
    /// Daily bin fill-level projection
    FillForecast {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, default_value = "7")]
        days: usize,
    },
    /// Order collection points urgency-first
    Route {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Flag anomalous readings
    Anomalies {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value = "air")]
        kind: SeriesKind,
    },
    /// Composite city health score
    Health {
        /// JSON with `air` readings and latest `fill_levels`
        #[arg(short, long, conflicts_with = "avg_aqi")]
        input: Option<PathBuf>,
        #[arg(long, requires = "total_bins")]
        avg_aqi: Option<f64>,
        #[arg(long, default_value = "0")]
        bins_needing_collection: usize,
        #[arg(long)]
        total_bins: Option<usize>,
    },
    /// Show the loaded model and policy
    Status,
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SeriesKind {
    /// Air-quality index, sigma threshold
    Air,
    /// Bin fill level, change threshold
    Fill,
}

// ============================================================================
// Input shapes
// ============================================================================

/// One history, or many keyed by entity id.
#[derive(Deserialize)]
#[serde(untagged)]
enum Histories<T> {
    Single(Vec<T>),
    Batch(BTreeMap<String, Vec<T>>),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output<R> {
    Single(R),
    Batch(BTreeMap<String, R>),
}

impl<T: Sync> Histories<T> {
    fn map<R, F>(&self, f: F) -> Output<R>
    where
        R: Send,
        F: Fn(&[T]) -> R + Sync,
    {
        match self {
            Histories::Single(history) => Output::Single(f(history)),
            Histories::Batch(batch) => {
                debug!(entities = batch.len(), "Processing batch");
                Output::Batch(
                    batch
                        .par_iter()
                        .map(|(id, history)| (id.clone(), f(history)))
                        .collect(),
                )
            }
        }
    }
}

#[derive(Deserialize)]
struct HealthInput {
    #[serde(default)]
    air: Vec<AirQualityReading>,
    #[serde(default)]
    fill_levels: Vec<f64>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load engine config {}", p.display())),
        None => {
            let config = EngineConfig::load();
            config.validate().context("Engine config is invalid")?;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    config::init(load_config(args.config.as_deref())?);
    let engine = AnalyticsEngine::new();

    match args.command {
        Command::Forecast { input, horizon } => {
            let histories: Histories<AirQualityReading> = read_json(&input)?;
            print_json(&histories.map(|h| engine.forecast_air_quality(h, horizon)))?;
        }
        Command::FillForecast { input, days } => {
            let histories: Histories<BinReading> = read_json(&input)?;
            print_json(&histories.map(|h| engine.forecast_fill_level(h, days)))?;
        }
        Command::Route { input } => {
            let candidates: Vec<RouteCandidate> = read_json(&input)?;
            info!(stops = candidates.len(), "Optimizing route");
            print_json(&engine.optimize_route(&candidates))?;
        }
        Command::Anomalies { input, kind } => match kind {
            SeriesKind::Air => {
                let histories: Histories<AirQualityReading> = read_json(&input)?;
                print_json(&histories.map(|h| engine.detect_air_quality_anomalies(h)))?;
            }
            SeriesKind::Fill => {
                let histories: Histories<BinReading> = read_json(&input)?;
                print_json(&histories.map(|h| engine.detect_fill_anomalies(h)))?;
            }
        },
        Command::Health {
            input,
            avg_aqi,
            bins_needing_collection,
            total_bins,
        } => {
            let score = match (input, avg_aqi) {
                (Some(path), _) => {
                    let data: HealthInput = read_json(&path)?;
                    engine.city_health_from_readings(&data.air, &data.fill_levels)
                }
                (None, Some(avg)) => {
                    engine.city_health(avg, bins_needing_collection, total_bins.unwrap_or(0))
                }
                (None, None) => anyhow::bail!("health needs --input or --avg-aqi with --total-bins"),
            };
            print_json(&score)?;
        }
        Command::Status => print_json(&engine.status())?,
        Command::ShowConfig => println!("{}", engine.config().to_toml()?),
    }

    Ok(())
}
