//! watervalue - hydropower water value estimation
//!
//! Reads production and price series from CSV, runs one or both estimation
//! methods and prints a JSON summary to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Both methods for a configured plant
//! watervalue --plant saurdal --production saurdal.csv --price no2.csv
//!
//! # Ad hoc limits, jump method only, with history
//! watervalue --production p.csv --price q.csv --prod-limits 0,200,400 \
//!     --method jump --history
//! ```
//!
//! # Environment Variables
//!
//! - `WATERVALUE_CONFIG`: Path to the TOML config (default: ./watervalue.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use watervalue::config::{AppConfig, EstimationMethod, EstimatorConfig};
use watervalue::estimator::{WaterValueEstimator, WaterValueHistory};
use watervalue::series_csv::load_series;
use watervalue::types::{HistoryPoint, IntervalEstimate, RawSeries};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "watervalue")]
#[command(about = "Estimate hydropower water values from production and price history")]
#[command(version)]
struct CliArgs {
    /// Production CSV (`timestamp,mw`)
    #[arg(long, value_name = "PATH")]
    production: PathBuf,

    /// Price CSV (`timestamp,price`)
    #[arg(long, value_name = "PATH")]
    price: PathBuf,

    /// Config file (overrides WATERVALUE_CONFIG / ./watervalue.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Plant id from the config's [[plants]] registry
    #[arg(long)]
    plant: Option<String>,

    #[arg(long, value_enum, default_value = "both")]
    method: MethodChoice,

    /// Comma-separated production limits (MW)
    #[arg(long, value_delimiter = ',', value_name = "MW,...")]
    prod_limits: Option<Vec<f64>>,

    /// Installed capacity (MW), used when no limits are given
    #[arg(long, value_name = "MW")]
    max_installed: Option<f64>,

    /// Plant can pump (negative production)
    #[arg(long)]
    negative_prod: bool,

    #[arg(long)]
    strictness: Option<f64>,

    /// Breakpoint validation half-window (minutes)
    #[arg(long, value_name = "MINUTES")]
    jumpm: Option<u32>,

    /// Fixed number of segments instead of automatic selection
    #[arg(long)]
    nsegments: Option<usize>,

    /// Point estimates instead of [lower, upper] intervals
    #[arg(long)]
    point: bool,

    /// Also compute the day-by-day water value history
    #[arg(long)]
    history: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "WATERVALUE_LOG_JSON")]
    log_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MethodChoice {
    Minimum,
    Jump,
    Both,
}

impl MethodChoice {
    fn methods(self) -> Vec<EstimationMethod> {
        match self {
            Self::Minimum => vec![EstimationMethod::Minimum],
            Self::Jump => vec![EstimationMethod::Jump],
            Self::Both => EstimationMethod::ALL.to_vec(),
        }
    }
}

// ============================================================================
// Summary Output
// ============================================================================

#[derive(Debug, Serialize)]
struct MethodSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    plant_id: Option<String>,
    method: EstimationMethod,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_breakpoints: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segment_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prod_limits: Vec<f64>,
    intervals: Vec<IntervalEstimate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    history: Vec<HistoryPoint>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let app = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::load(),
    };
    let config = resolve_config(&args, &app)?;

    let production = load_series(&args.production)
        .with_context(|| format!("reading production {}", args.production.display()))?;
    let price = load_series(&args.price)
        .with_context(|| format!("reading price {}", args.price.display()))?;
    info!(
        production_rows = production.len(),
        price_rows = price.len(),
        "Input series loaded"
    );

    let summaries: Vec<MethodSummary> = args
        .method
        .methods()
        .into_par_iter()
        .map(|method| run_method(&args, &config, method, &production, &price))
        .collect();

    let json = serde_json::to_string_pretty(&summaries).context("serializing summary")?;
    println!("{json}");

    if summaries.iter().all(|s| s.status == "error") {
        bail!("every estimation method failed");
    }
    Ok(())
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
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

/// Base options from the config file, narrowed to the plant, then CLI overrides.
fn resolve_config(args: &CliArgs, app: &AppConfig) -> Result<EstimatorConfig> {
    let mut config = match &args.plant {
        Some(id) => app
            .plant(id)
            .with_context(|| format!("plant '{id}' not found in config"))?
            .estimator_config(&app.estimator),
        None => app.estimator.clone(),
    };

    if let Some(limits) = &args.prod_limits {
        config.prod_limits = Some(limits.clone());
    }
    if let Some(max) = args.max_installed {
        config.max_installed = Some(max);
    }
    if args.negative_prod {
        config.negative_prod = true;
    }
    if let Some(strictness) = args.strictness {
        config.strictness = strictness;
    }
    if let Some(jumpm) = args.jumpm {
        config.jump_minutes = jumpm;
    }
    if args.nsegments.is_some() {
        config.segment_count = args.nsegments;
    }
    if args.point {
        config.interval_output = false;
    }

    config.validate().context("invalid estimator options")?;
    Ok(config)
}

fn run_method(
    args: &CliArgs,
    base: &EstimatorConfig,
    method: EstimationMethod,
    production: &RawSeries,
    price: &RawSeries,
) -> MethodSummary {
    let config = EstimatorConfig {
        method,
        ..base.clone()
    };

    match WaterValueEstimator::estimate(production, price, &config) {
        Ok(result) => {
            info!(
                %method,
                valid_breakpoints = result.valid_breakpoint_count(),
                segments = result.segment_count,
                "Estimation complete"
            );
            let history = if args.history {
                WaterValueHistory::compute(production, price, &config)
            } else {
                Vec::new()
            };
            MethodSummary {
                plant_id: args.plant.clone(),
                method,
                status: "ok",
                message: None,
                valid_breakpoints: Some(result.valid_breakpoint_count()),
                observations: Some(result.timestamps.len()),
                segment_count: Some(result.segment_count),
                prod_limits: result.prod_limits.clone(),
                intervals: result.intervals(),
                history,
            }
        }
        Err(e) => {
            error!(%method, error = %e, "Estimation failed");
            MethodSummary {
                plant_id: args.plant.clone(),
                method,
                status: "error",
                message: Some(e.to_string()),
                valid_breakpoints: None,
                observations: None,
                segment_count: None,
                prod_limits: config.prod_limits.clone().unwrap_or_default(),
                intervals: Vec::new(),
                history: Vec::new(),
            }
        }
    }
}
