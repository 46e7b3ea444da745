//! Jump Method
//!
//! Bounds each interval by the price range seen while production jumped
//! into it. Only the most recent UTC day counts, since older transitions
//! reflect older reservoir conditions.

use statrs::statistics::Statistics;
use tracing::debug;

use super::breakpoints::ValidatedBreakpoint;
use super::fine_grid::FineGrid;
use super::utc_day_start;
use crate::types::IntervalBounds;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    lower: f64,
    upper: f64,
    width: f64,
}

impl Candidate {
    /// Narrower wins; equal widths go to the lower maximum.
    fn beats(&self, other: &Self) -> bool {
        self.width < other.width || (self.width == other.width && self.upper < other.upper)
    }
}

/// Breakpoint-change interval estimator
pub struct JumpEstimator;

impl JumpEstimator {
    /// Raw (unenforced) bounds for `n_intervals` intervals.
    ///
    /// A validated breakpoint on the same UTC day as `production_end`
    /// contributes to the highest level inside its window; level 0 carries
    /// no water value. Intervals without evidence stay NaN.
    pub fn estimate(
        n_intervals: usize,
        validated: &[ValidatedBreakpoint],
        grid: &FineGrid,
        production_end: i64,
    ) -> IntervalBounds {
        let mut best: Vec<Option<Candidate>> = vec![None; n_intervals];
        let last_day = utc_day_start(production_end);

        for breakpoint in validated {
            if utc_day_start(breakpoint.timestamp) != last_day {
                continue;
            }
            let Some(level) = grid.levels[breakpoint.window.clone()].iter().max().copied() else {
                continue;
            };
            if level == 0 || level > n_intervals {
                continue;
            }

            let prices = &grid.prices[breakpoint.window.clone()];
            let lower = Statistics::min(prices.iter());
            let upper = Statistics::max(prices.iter());
            let candidate = Candidate {
                lower,
                upper,
                width: (upper - lower).max(0.0),
            };
            debug!(
                timestamp = breakpoint.timestamp,
                level,
                lower,
                upper,
                "Jump candidate"
            );

            let replace = best[level - 1].map_or(true, |current| candidate.beats(&current));
            if replace {
                best[level - 1] = Some(candidate);
            }
        }

        let mut bounds = IntervalBounds::unknown(n_intervals);
        for (idx, candidate) in best.iter().enumerate() {
            if let Some(c) = candidate {
                bounds.lower[idx] = c.lower;
                bounds.upper[idx] = c.upper;
            }
        }
        bounds
    }
}
