//! Estimation outputs: breakpoint flags, interval bounds and the result bundle.

use serde::{Deserialize, Serialize};

use crate::config::EstimationMethod;

/// Per-sample segmentation tag.
///
/// Serialized as the integer codes 0/1/2 consumed by downstream tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BreakpointFlag {
    /// Sample inside a segment
    #[default]
    Interior,
    /// First sample of a new segment, not (yet) confirmed by price movement
    Candidate,
    /// Boundary where price and production moved in the same direction
    Validated,
}

impl BreakpointFlag {
    pub fn code(self) -> u8 {
        match self {
            Self::Interior => 0,
            Self::Candidate => 1,
            Self::Validated => 2,
        }
    }

    /// Candidate or validated.
    pub fn is_boundary(self) -> bool {
        !matches!(self, Self::Interior)
    }
}

impl From<BreakpointFlag> for u8 {
    fn from(flag: BreakpointFlag) -> Self {
        flag.code()
    }
}

impl TryFrom<u8> for BreakpointFlag {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Interior),
            1 => Ok(Self::Candidate),
            2 => Ok(Self::Validated),
            other => Err(format!("invalid breakpoint code {other}, expected 0, 1 or 2")),
        }
    }
}

/// Lower/upper water value bounds indexed by `interval - 1`.
///
/// Interval `i` (1-based) covers production between `limits[i-1]` and
/// `limits[i]`; the interval below the first limit carries no water value.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl IntervalBounds {
    /// `n` intervals with no evidence.
    pub fn unknown(n: usize) -> Self {
        Self {
            lower: vec![f64::NAN; n],
            upper: vec![f64::NAN; n],
        }
    }

    pub fn len(&self) -> usize {
        self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }
}

/// One row of the tidy water value table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalEstimate {
    /// 1-based production interval
    pub interval: usize,
    pub lower: f64,
    pub upper: f64,
}

/// Everything a single estimation call produces.
#[derive(Debug, Clone, Serialize)]
pub struct WaterValueResult {
    /// `[lower₁, upper₁, lower₂, upper₂, …]` in interval mode, otherwise one
    /// point estimate per interval. NaN where no evidence exists.
    pub water_values: Vec<f64>,
    /// Segment mean broadcast to every production sample
    pub level_means: Vec<f64>,
    /// Discrete production interval per sample, `0..=n_intervals`
    pub production_levels: Vec<usize>,
    /// Breakpoint tag per sample
    pub breakpoints: Vec<BreakpointFlag>,
    /// Prepared production timestamps (epoch seconds) the per-sample arrays refer to
    pub timestamps: Vec<i64>,
    /// Production limits that defined the intervals
    pub prod_limits: Vec<f64>,
    /// Number of segments of the piecewise-constant fit
    pub segment_count: usize,
    pub method: EstimationMethod,
    pub interval_output: bool,
}

impl WaterValueResult {
    /// Number of production intervals carrying a water value.
    pub fn n_intervals(&self) -> usize {
        self.prod_limits.len()
    }

    /// Breakpoints confirmed by joint price/production movement.
    pub fn valid_breakpoint_count(&self) -> usize {
        self.breakpoints
            .iter()
            .filter(|f| **f == BreakpointFlag::Validated)
            .count()
    }

    /// Water values as `(interval, lower, upper)` rows, skipping intervals
    /// without any estimate. Point estimates report `lower == upper`.
    pub fn intervals(&self) -> Vec<IntervalEstimate> {
        let rows: Vec<IntervalEstimate> = if self.interval_output {
            self.water_values
                .chunks_exact(2)
                .enumerate()
                .map(|(i, pair)| IntervalEstimate {
                    interval: i + 1,
                    lower: pair[0],
                    upper: pair[1],
                })
                .collect()
        } else {
            self.water_values
                .iter()
                .enumerate()
                .map(|(i, v)| IntervalEstimate {
                    interval: i + 1,
                    lower: *v,
                    upper: *v,
                })
                .collect()
        };

        rows.into_iter()
            .filter(|row| !(row.lower.is_nan() && row.upper.is_nan()))
            .collect()
    }
}

/// Interval estimates obtained from the data available up to one day.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    /// 12:00 UTC of the evaluated day (epoch seconds)
    pub timestamp: i64,
    pub intervals: Vec<IntervalEstimate>,
}
