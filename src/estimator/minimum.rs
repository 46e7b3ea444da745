//! Minimum Method
//!
//! While production sits in interval `L`, the price never dropped below the
//! water value of `L`, so the cheapest price seen there is an upper bound.
//! The dearest price seen while producing less gives a lower bound.
//! Prices around validated transitions are neutralised first so the jump
//! itself does not leak into either bound.

use statrs::statistics::Statistics;
use tracing::debug;

use super::breakpoints::ValidatedBreakpoint;
use super::fine_grid::FineGrid;
use crate::config::defaults::{NOISE_WINDOW_MINUTES, SECS_PER_MINUTE};
use crate::types::IntervalBounds;

/// Minimum-value interval estimator
pub struct MinimumEstimator;

impl MinimumEstimator {
    /// Raw (unenforced) bounds for `n_intervals` intervals.
    ///
    /// Grid points later than `discard_end_minutes` before `production_end`
    /// are ignored, unless that cutoff falls at or before the grid start.
    /// The grid may stop short of `production_end` by up to one step.
    pub fn estimate(
        n_intervals: usize,
        validated: &[ValidatedBreakpoint],
        grid: &FineGrid,
        production_end: i64,
        discard_end_minutes: u32,
    ) -> IntervalBounds {
        let mut bounds = IntervalBounds::unknown(n_intervals);
        let Some(start) = grid.start() else {
            return bounds;
        };

        let (price_for_min, price_for_max) = Self::neutralise(validated, grid);

        let mut keep = grid.len();
        if discard_end_minutes > 0 {
            let cutoff = production_end - i64::from(discard_end_minutes) * SECS_PER_MINUTE;
            if cutoff > start {
                keep = grid.count_until(cutoff);
            }
        }
        if keep == 0 {
            return bounds;
        }

        // per level, indexed 0..=n_intervals
        let mut cheapest = vec![f64::INFINITY; n_intervals + 1];
        let mut dearest = vec![f64::NEG_INFINITY; n_intervals + 1];
        let mut seen = vec![false; n_intervals + 1];
        for idx in 0..keep {
            let level = grid.levels[idx].min(n_intervals);
            seen[level] = true;
            cheapest[level] = cheapest[level].min(price_for_min[idx]);
            dearest[level] = dearest[level].max(price_for_max[idx]);
        }

        let mut below: Option<f64> = None;
        for level in 0..=n_intervals {
            if level > 0 && seen[level] {
                let upper = cheapest[level];
                bounds.upper[level - 1] = upper;
                bounds.lower[level - 1] = below.map_or(f64::NAN, |b| b.min(upper));
                debug!(level, upper, lower = bounds.lower[level - 1], "Minimum bounds");
            }
            if seen[level] {
                below = Some(below.map_or(dearest[level], |b| b.max(dearest[level])));
            }
        }

        bounds
    }

    /// Price copies with every `±59 min` window around a validated breakpoint
    /// flattened: to the window maximum for the minimum accumulator, to the
    /// window minimum for the maximum accumulator. Windows are measured on
    /// the original prices; later windows overwrite earlier ones.
    fn neutralise(validated: &[ValidatedBreakpoint], grid: &FineGrid) -> (Vec<f64>, Vec<f64>) {
        let mut price_for_min = grid.prices.clone();
        let mut price_for_max = grid.prices.clone();
        let half_width = NOISE_WINDOW_MINUTES * SECS_PER_MINUTE;

        for breakpoint in validated {
            let Some(window) = grid.window(breakpoint.timestamp, half_width) else {
                continue;
            };
            let original = &grid.prices[window.clone()];
            let high = Statistics::max(original.iter());
            let low = Statistics::min(original.iter());
            price_for_min[window.clone()].fill(high);
            price_for_max[window].fill(low);
        }

        (price_for_min, price_for_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeSeries;

    fn grid(levels: &[usize], prices: &[f64]) -> FineGrid {
        let ts: Vec<i64> = (0..levels.len() as i64).map(|i| i * 240).collect();
        let production = TimeSeries::from_sorted_unique(ts.clone(), vec![0.0; levels.len()]);
        let price = TimeSeries::from_sorted_unique(ts, prices.to_vec());
        FineGrid::expand(&production, levels, &price)
    }

    fn last(g: &FineGrid) -> i64 {
        g.end().unwrap_or_default()
    }

    #[test]
    fn test_flat_production_oscillating_price() {
        let prices: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 10.0 } else { 50.0 }).collect();
        let g = grid(&[1; 60], &prices);
        let bounds = MinimumEstimator::estimate(1, &[], &g, last(&g), 60);
        assert_eq!(bounds.upper[0], 10.0);
        assert!(bounds.lower[0].is_nan());
    }

    #[test]
    fn test_lower_from_dearest_price_below() {
        // level 1 with prices up to 30, then level 2 with cheapest 45
        let levels = [1, 1, 1, 2, 2, 2];
        let prices = [20.0, 30.0, 25.0, 50.0, 45.0, 60.0];
        let g = grid(&levels, &prices);
        let bounds = MinimumEstimator::estimate(2, &[], &g, last(&g), 0);
        assert_eq!(bounds.upper[0], 20.0);
        assert!(bounds.lower[0].is_nan());
        assert_eq!(bounds.upper[1], 45.0);
        assert_eq!(bounds.lower[1], 30.0);
    }

    #[test]
    fn test_lower_capped_by_upper() {
        let levels = [0, 0, 1, 1];
        let prices = [90.0, 80.0, 40.0, 50.0];
        let g = grid(&levels, &prices);
        let bounds = MinimumEstimator::estimate(1, &[], &g, last(&g), 0);
        assert_eq!(bounds.upper[0], 40.0);
        assert_eq!(bounds.lower[0], 40.0);
    }

    #[test]
    fn test_discard_end_drops_trailing_points() {
        // last 4 points (960 s) would give a cheaper price at level 1
        let levels = [1; 10];
        let prices = [30.0, 30.0, 30.0, 30.0, 30.0, 30.0, 5.0, 5.0, 5.0, 5.0];
        let g = grid(&levels, &prices);
        let kept = MinimumEstimator::estimate(1, &[], &g, last(&g), 16);
        assert_eq!(kept.upper[0], 30.0);
        let all = MinimumEstimator::estimate(1, &[], &g, last(&g), 0);
        assert_eq!(all.upper[0], 5.0);
    }

    #[test]
    fn test_discard_measured_from_production_end() {
        // grid ends at 2160 s but the last production sample is at 2280 s
        let mut prices = [30.0; 10];
        prices[6] = 5.0;
        let g = grid(&[1; 10], &prices);
        let bounds = MinimumEstimator::estimate(1, &[], &g, 2_280, 14);
        // cutoff 2280 - 840 = 1440 keeps the 5.0 at grid point 6
        assert_eq!(bounds.upper[0], 5.0);
    }

    #[test]
    fn test_discard_longer_than_grid_keeps_everything() {
        let g = grid(&[1; 5], &[30.0, 30.0, 30.0, 30.0, 5.0]);
        let bounds = MinimumEstimator::estimate(1, &[], &g, last(&g), 600);
        assert_eq!(bounds.upper[0], 5.0);
    }

    #[test]
    fn test_breakpoint_window_neutralised() {
        // jump from level 1 to 2 at sample 10 with a price spike around it
        let mut levels = vec![1; 10];
        levels.extend(vec![2; 10]);
        let mut prices = vec![20.0; 20];
        prices[9] = 5.0;
        let g = grid(&levels, &prices);
        let bp = ValidatedBreakpoint {
            sample: 10,
            timestamp: g.timestamps[10],
            window: 0..=19,
        };
        let bounds = MinimumEstimator::estimate(2, &[bp], &g, last(&g), 0);
        // the 5.0 dip lies within 59 min of the breakpoint and is lifted to 20
        assert_eq!(bounds.upper[0], 20.0);
    }
}
