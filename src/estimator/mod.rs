//! Water value estimation
//!
//! Infers the marginal value of stored water from how a plant's production
//! responded to electricity prices.
//!
//! ## Architecture
//! - `preparation`: input validation, snapping and deduplication
//! - `segmentation`: DP piecewise-constant fit and segment-count selection
//! - `levels`: production limits and interval indices
//! - `fine_grid`: uniform-grid expansion of levels and prices
//! - `breakpoints`: joint price/production validation of boundaries
//! - `jump`, `minimum`: the two interval estimators
//! - `monotonic`: bound ordering and output assembly
//! - `analyzer`: orchestrates one call
//! - `history`: day-by-day re-estimation (rayon)

pub mod analyzer;
pub mod breakpoints;
pub mod fine_grid;
pub mod history;
pub mod jump;
pub mod levels;
pub mod minimum;
pub mod monotonic;
pub mod preparation;
pub mod segmentation;

pub use analyzer::WaterValueEstimator;
pub use breakpoints::{BreakpointValidation, BreakpointValidator, ValidatedBreakpoint};
pub use fine_grid::FineGrid;
pub use history::WaterValueHistory;
pub use jump::JumpEstimator;
pub use levels::LevelDiscretizer;
pub use minimum::MinimumEstimator;
pub use monotonic::MonotonicEnforcer;
pub use preparation::SeriesPreparer;
pub use segmentation::{PiecewiseConstantFit, SegmentCost, Segmenter};

use chrono::{DateTime, Utc};

use crate::config::defaults::SECS_PER_DAY;

/// Start of the UTC calendar day containing `ts` (epoch seconds).
pub(crate) fn utc_day_start(ts: i64) -> i64 {
    ts.div_euclid(SECS_PER_DAY) * SECS_PER_DAY
}

/// RFC 3339 rendering for log fields; raw seconds if out of chrono's range.
pub(crate) fn format_utc(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
