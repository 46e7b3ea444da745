//! Water Value Estimator
//!
//! Orchestrates one estimation call:
//! 1. Validates the options and both input series
//! 2. Fits a piecewise-constant curve to production
//! 3. Maps segment means to production intervals
//! 4. Expands levels and prices onto the fine grid
//! 5. Keeps breakpoints where price and production moved together
//! 6. Derives interval bounds with the configured method
//! 7. Orders the bounds and assembles the result

use tracing::{debug, info};

use super::{
    breakpoints::BreakpointValidator, fine_grid::FineGrid, format_utc, jump::JumpEstimator,
    levels::LevelDiscretizer, minimum::MinimumEstimator, monotonic::MonotonicEnforcer,
    preparation::SeriesPreparer, segmentation::Segmenter,
};
use crate::config::{EstimationMethod, EstimatorConfig};
use crate::types::{RawSeries, WaterValueError, WaterValueResult};

/// Batch water value estimator
pub struct WaterValueEstimator;

impl WaterValueEstimator {
    /// Estimate water values from production and price history.
    ///
    /// All validation happens before any computation, so an `Err` never
    /// comes with partial output. Missing evidence shows up as NaN.
    pub fn estimate(
        production: &RawSeries,
        price: &RawSeries,
        config: &EstimatorConfig,
    ) -> Result<WaterValueResult, WaterValueError> {
        config.validate()?;
        let limits = LevelDiscretizer::resolve_limits(config)?;
        let n_intervals = limits.len();

        let production = SeriesPreparer::prepare(production, "production", config.snap_seconds)?;
        let price = SeriesPreparer::prepare(price, "price", 0)?;
        SeriesPreparer::ensure_sufficient(&production)?;

        let (Some(production_start), Some(production_end)) =
            (production.first_timestamp(), production.last_timestamp())
        else {
            return Err(WaterValueError::InvalidInput(
                "production: no samples supplied".to_string(),
            ));
        };
        info!(
            production_begin = %format_utc(production_start),
            production_end = %format_utc(production_end),
            price_begin = %price.first_timestamp().map(format_utc).unwrap_or_default(),
            price_end = %price.last_timestamp().map(format_utc).unwrap_or_default(),
            samples = production.len(),
            "Estimation data window"
        );

        let fit = Segmenter::fit(production.values(), config.segment_count, config.strictness)?;
        info!(segments = fit.segment_count, method = %config.method, "Production segmented");

        let levels = LevelDiscretizer::discretize(&fit.level_means, &limits);
        let grid = FineGrid::expand(&production, &levels, &price);
        let validation =
            BreakpointValidator::validate(&production, &fit.flags, &grid, config.jump_minutes);

        let raw_bounds = match config.method {
            EstimationMethod::Jump => JumpEstimator::estimate(
                n_intervals,
                &validation.validated,
                &grid,
                production_end,
            ),
            EstimationMethod::Minimum => MinimumEstimator::estimate(
                n_intervals,
                &validation.validated,
                &grid,
                production_end,
                config.discard_end_minutes,
            ),
        };
        let bounds = MonotonicEnforcer::enforce(&raw_bounds);
        let water_values = MonotonicEnforcer::water_values(&bounds, config.interval_output);
        debug!(?water_values, "Water values assembled");

        Ok(WaterValueResult {
            water_values,
            level_means: fit.level_means,
            production_levels: levels,
            breakpoints: validation.flags,
            timestamps: production.timestamps().to_vec(),
            prod_limits: limits,
            segment_count: fit.segment_count,
            method: config.method,
            interval_output: config.interval_output,
        })
    }
}
