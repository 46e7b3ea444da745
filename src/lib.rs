//! watervalue: Hydropower Water Value Estimation
//!
//! Infers the implicit value of stored water for a set of production
//! intervals from a plant's production history and the electricity price.
//!
//! ## Architecture
//!
//! - **Estimator**: segmentation, breakpoint validation, interval estimators
//! - **Config**: estimator options and the plant registry (TOML)
//! - **Types**: input series, results and the error taxonomy
//! - **Series CSV**: loading `timestamp,value` files for the CLI
//!
//! ```ignore
//! use watervalue::{EstimatorConfig, RawSeries, WaterValueEstimator};
//!
//! let config = EstimatorConfig::with_limits(vec![0.0, 200.0, 400.0]);
//! let result = WaterValueEstimator::estimate(&production, &price, &config)?;
//! for row in result.intervals() {
//!     println!("{}: [{}, {}]", row.interval, row.lower, row.upper);
//! }
//! ```

pub mod config;
pub mod estimator;
pub mod series_csv;
pub mod types;

// Re-export configuration
pub use config::{AppConfig, ConfigError, EstimationMethod, EstimatorConfig, PlantConfig};

// Re-export the entry points
pub use estimator::{WaterValueEstimator, WaterValueHistory};

// Re-export commonly used types
pub use types::{
    BreakpointFlag, HistoryPoint, IntervalBounds, IntervalEstimate, RawSeries, TimeSeries,
    WaterValueError, WaterValueResult,
};
