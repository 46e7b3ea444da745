//! Water Value History
//!
//! Approximates how the estimate evolved by re-running it on the data
//! available at the end of each UTC day. Long histories are thinned to at
//! most 60 evenly spaced days. Days are independent and run in parallel.

use rayon::prelude::*;
use tracing::{debug, info};

use super::analyzer::WaterValueEstimator;
use super::utc_day_start;
use crate::config::defaults::{HISTORY_MAX_POINTS, MIN_PRODUCTION_SAMPLES, SECS_PER_DAY};
use crate::config::EstimatorConfig;
use crate::types::{HistoryPoint, RawSeries};

/// Day-by-day re-estimation
pub struct WaterValueHistory;

impl WaterValueHistory {
    /// Interval estimates for each evaluated day, oldest first.
    ///
    /// Every run uses interval output regardless of `config`. Days with fewer
    /// than 10 production samples so far, failing runs and runs without any
    /// estimate are left out. Each point is stamped at 12:00 UTC of its day.
    pub fn compute(
        production: &RawSeries,
        price: &RawSeries,
        config: &EstimatorConfig,
    ) -> Vec<HistoryPoint> {
        let days = Self::select_days(&Self::production_days(production));
        if days.is_empty() {
            return Vec::new();
        }

        let config = EstimatorConfig {
            interval_output: true,
            ..config.clone()
        };

        let points: Vec<HistoryPoint> = days
            .par_iter()
            .filter_map(|&day| Self::evaluate_day(production, price, &config, day))
            .collect();

        info!(
            days = days.len(),
            points = points.len(),
            "Water value history computed"
        );
        points
    }

    /// Distinct UTC day starts of the production timestamps, ascending.
    fn production_days(production: &RawSeries) -> Vec<i64> {
        let mut days: Vec<i64> = production
            .timestamps
            .iter()
            .filter(|t| t.is_finite())
            .map(|t| utc_day_start(*t as i64))
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// At most 60 days, evenly spaced and always including the first and
    /// last day.
    fn select_days(days: &[i64]) -> Vec<i64> {
        if days.len() <= HISTORY_MAX_POINTS {
            return days.to_vec();
        }
        let last = days.len() - 1;
        (0..HISTORY_MAX_POINTS)
            .map(|i| days[i * last / (HISTORY_MAX_POINTS - 1)])
            .collect()
    }

    fn evaluate_day(
        production: &RawSeries,
        price: &RawSeries,
        config: &EstimatorConfig,
        day: i64,
    ) -> Option<HistoryPoint> {
        let cutoff = (day + SECS_PER_DAY) as f64;
        let production = production.before(cutoff);
        if production.len() < MIN_PRODUCTION_SAMPLES {
            return None;
        }
        let price = price.before(cutoff);

        match WaterValueEstimator::estimate(&production, &price, config) {
            Ok(result) => {
                let intervals = result.intervals();
                (!intervals.is_empty()).then(|| HistoryPoint {
                    timestamp: day + SECS_PER_DAY / 2,
                    intervals,
                })
            }
            Err(e) => {
                debug!(day, error = %e, "History day skipped");
                None
            }
        }
    }
}
