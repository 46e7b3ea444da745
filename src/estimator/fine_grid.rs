//! Fine-Grid Expansion
//!
//! Production levels and prices are sampled onto one uniform grid spanning
//! the production series. Each grid point takes the most recent sample at
//! or before it; points before the first sample take the first sample.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::config::defaults::DEFAULT_GRID_STEP_SECS;
use crate::types::TimeSeries;

/// Levels and prices on a shared uniform time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FineGrid {
    pub step_secs: i64,
    pub timestamps: Vec<i64>,
    pub levels: Vec<usize>,
    pub prices: Vec<f64>,
}

impl FineGrid {
    /// Build the grid from the prepared production series, its per-sample
    /// levels and the prepared price series.
    ///
    /// The step is the smallest production spacing (240 s for a single
    /// sample). Both inputs must be non-empty.
    pub fn expand(production: &TimeSeries, levels: &[usize], price: &TimeSeries) -> Self {
        let step_secs = production
            .min_spacing()
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_GRID_STEP_SECS);

        let (start, end) = match (production.first_timestamp(), production.last_timestamp()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Self {
                    step_secs,
                    timestamps: Vec::new(),
                    levels: Vec::new(),
                    prices: Vec::new(),
                }
            }
        };

        let timestamps: Vec<i64> = (0..)
            .map(|i| start + i * step_secs)
            .take_while(|t| *t <= end)
            .collect();

        let levels = as_of(production.timestamps(), levels, &timestamps);
        let prices = as_of(price.timestamps(), price.values(), &timestamps);
        debug!(
            step_secs,
            points = timestamps.len(),
            "Fine grid built"
        );

        Self {
            step_secs,
            timestamps,
            levels,
            prices,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn start(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    pub fn end(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    /// Grid indices with timestamps in `[center - half_width, center + half_width]`.
    /// `None` when no grid point falls inside.
    pub fn window(&self, center: i64, half_width_secs: i64) -> Option<RangeInclusive<usize>> {
        let lo = self
            .timestamps
            .partition_point(|t| *t < center - half_width_secs);
        let hi = self
            .timestamps
            .partition_point(|t| *t <= center + half_width_secs);
        (lo < hi).then(|| lo..=hi - 1)
    }

    /// Number of leading grid points at or before `cutoff`.
    pub fn count_until(&self, cutoff: i64) -> usize {
        self.timestamps.partition_point(|t| *t <= cutoff)
    }
}

/// Forward-fill `values` (sampled at `source`) onto `targets`, back-filling
/// targets that precede the first source sample.
fn as_of<T: Copy>(source: &[i64], values: &[T], targets: &[i64]) -> Vec<T> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let mut cursor = 0;
    let mut current = first;
    targets
        .iter()
        .map(|t| {
            while cursor < source.len() && source[cursor] <= *t {
                current = values[cursor];
                cursor += 1;
            }
            current
        })
        .collect()
}
