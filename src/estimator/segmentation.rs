//! Piecewise-Constant Segmentation
//!
//! Least-squares fit of a step function to the production series by
//! dynamic programming over segment counts `1..=K_max`, followed by an
//! automatic choice of the segment count from the curvature of the
//! normalised cost curve.
//!
//! ## Tables
//! Row `k` of the flat `K_max × n` tables holds the best cost of splitting
//! samples `0..=j` into `k + 1` segments, and the end of the previous
//! segment for that split.

use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::defaults::{FLAT_COST_TOLERANCE, MAX_SEGMENTS};
use crate::types::{BreakpointFlag, WaterValueError};

// ============================================================================
// Segment Cost
// ============================================================================

/// Sum of squared deviations from the mean over any inclusive range, in O(1).
#[derive(Debug, Clone)]
pub struct SegmentCost {
    prefix_sum: Vec<f64>,
    prefix_sq: Vec<f64>,
}

impl SegmentCost {
    pub fn new(values: &[f64]) -> Self {
        let mut prefix_sum = Vec::with_capacity(values.len() + 1);
        let mut prefix_sq = Vec::with_capacity(values.len() + 1);
        prefix_sum.push(0.0);
        prefix_sq.push(0.0);
        for v in values {
            prefix_sum.push(prefix_sum[prefix_sum.len() - 1] + v);
            prefix_sq.push(prefix_sq[prefix_sq.len() - 1] + v * v);
        }
        Self {
            prefix_sum,
            prefix_sq,
        }
    }

    /// Cost of samples `start..=end`. Rounding noise below zero is clamped.
    pub fn cost(&self, start: usize, end: usize) -> f64 {
        let len = (end - start + 1) as f64;
        let sum = self.prefix_sum[end + 1] - self.prefix_sum[start];
        let sq = self.prefix_sq[end + 1] - self.prefix_sq[start];
        (sq - sum * sum / len).max(0.0)
    }
}

// ============================================================================
// Segmentation Result
// ============================================================================

/// Step-function fit of the production series.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseConstantFit {
    /// Number of segments used
    pub segment_count: usize,
    /// Mean of the enclosing segment, per sample
    pub level_means: Vec<f64>,
    /// `Candidate` on the first sample of every segment after the first
    pub flags: Vec<BreakpointFlag>,
    /// Optimal total cost for `1..=K_max` segments
    pub objective: Vec<f64>,
}

/// Dynamic-programming segmenter
pub struct Segmenter;

impl Segmenter {
    /// Fit a step function to `values`.
    ///
    /// With `segment_count = None` the count is chosen by
    /// [`Segmenter::select_segment_count`]; an explicit count must lie in
    /// `1..=min(24, n)`.
    pub fn fit(
        values: &[f64],
        segment_count: Option<usize>,
        strictness: f64,
    ) -> Result<PiecewiseConstantFit, WaterValueError> {
        let n = values.len();
        if n == 0 {
            return Err(WaterValueError::InvalidInput(
                "cannot segment an empty series".to_string(),
            ));
        }
        let k_max = MAX_SEGMENTS.min(n);
        if let Some(k) = segment_count {
            if k == 0 || k > k_max {
                return Err(WaterValueError::InvalidConfig(format!(
                    "nsegments must be between 1 and {k_max} (min(24, number of samples)), got {k}"
                )));
            }
        }

        let table = DpTable::build(values, k_max);
        let objective = table.objective();
        let chosen = match segment_count {
            Some(k) => k,
            None => Self::select_segment_count(&objective, strictness),
        };
        debug!(samples = n, k_max, segments = chosen, "Segmentation complete");

        let endpoints = table.endpoints(chosen);
        let mut level_means = vec![0.0; n];
        let mut flags = vec![BreakpointFlag::Interior; n];
        let mut start = 0;
        for &end in &endpoints {
            let mean = values[start..=end].iter().mean();
            level_means[start..=end].fill(mean);
            if start > 0 {
                flags[start] = BreakpointFlag::Candidate;
            }
            start = end + 1;
        }

        Ok(PiecewiseConstantFit {
            segment_count: chosen,
            level_means,
            flags,
            objective,
        })
    }

    /// Curvature ("segselect") choice of the segment count.
    ///
    /// `objective[k]` is the optimal cost for `k + 1` segments. The curve is
    /// rescaled to run from `K_max` (one segment) down to 1, and the largest
    /// index whose second difference reaches `strictness` decides. A flat
    /// curve or a single candidate means one segment.
    pub fn select_segment_count(objective: &[f64], strictness: f64) -> usize {
        let k_max = objective.len();
        if k_max <= 1 {
            return 1;
        }
        let first = objective[0];
        let last = objective[k_max - 1];
        let denom = last - first;
        if denom.abs() <= FLAT_COST_TOLERANCE {
            return 1;
        }

        let scale = (k_max - 1) as f64;
        let normalised: Vec<f64> = objective
            .iter()
            .map(|j| scale * (last - j) / denom + 1.0)
            .collect();

        normalised
            .windows(3)
            .map(|w| w[2] - 2.0 * w[1] + w[0])
            .enumerate()
            .filter(|(_, curvature)| *curvature >= strictness)
            .map(|(idx, _)| idx + 2)
            .last()
            .unwrap_or(1)
    }
}

// ============================================================================
// DP Tables
// ============================================================================

struct DpTable {
    n: usize,
    k_max: usize,
    cost: Vec<f64>,
    back: Vec<usize>,
}

impl DpTable {
    fn build(values: &[f64], k_max: usize) -> Self {
        let n = values.len();
        let costs = SegmentCost::new(values);
        let mut cost = vec![f64::INFINITY; k_max * n];
        let mut back = vec![usize::MAX; k_max * n];

        for j in 0..n {
            cost[j] = costs.cost(0, j);
        }

        for k in 1..k_max {
            let (prev_rows, row) = cost.split_at_mut(k * n);
            let prev = &prev_rows[(k - 1) * n..];
            for j in k..n {
                let mut best = f64::INFINITY;
                let mut best_idx = usize::MAX;
                for i in (k - 1)..j {
                    let candidate = prev[i] + costs.cost(i + 1, j);
                    // strict comparison keeps the first minimiser
                    if candidate < best {
                        best = candidate;
                        best_idx = i;
                    }
                }
                row[j] = best;
                back[k * n + j] = best_idx;
            }
        }

        Self {
            n,
            k_max,
            cost,
            back,
        }
    }

    /// Optimal total cost per segment count.
    fn objective(&self) -> Vec<f64> {
        (0..self.k_max)
            .map(|k| self.cost[k * self.n + self.n - 1])
            .collect()
    }

    /// Inclusive end index of every segment, ascending.
    fn endpoints(&self, segments: usize) -> Vec<usize> {
        let mut endpoints = Vec::with_capacity(segments);
        let mut j = self.n - 1;
        for k in (0..segments).rev() {
            endpoints.push(j);
            if k == 0 {
                break;
            }
            j = self.back[k * self.n + j];
        }
        endpoints.reverse();
        endpoints
    }
}
