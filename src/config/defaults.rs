//! System-wide default constants.
//!
//! Centralises the numbers the estimator relies on. Grouped by stage.

// ============================================================================
// Series Preparation
// ============================================================================

/// Minimum number of production samples after deduplication.
pub const MIN_PRODUCTION_SAMPLES: usize = 10;

/// Minimum time span covered by the production series (seconds). 3 hours.
pub const MIN_PRODUCTION_SPAN_SECS: i64 = 3 * 3_600;

/// Production timestamps are floored to a multiple of this (seconds).
///
/// 240 s = 4 minutes, also the fallback fine-grid resolution.
pub const DEFAULT_SNAP_SECS: u32 = 240;

// ============================================================================
// Segmentation
// ============================================================================

/// Upper bound on the number of piecewise-constant segments.
pub const MAX_SEGMENTS: usize = 24;

/// Curvature threshold for automatic segment-count selection.
pub const DEFAULT_STRICTNESS: f64 = 0.5;

/// Absolute tolerance below which the total cost range counts as flat.
pub const FLAT_COST_TOLERANCE: f64 = 1e-8;

// ============================================================================
// Levels
// ============================================================================

/// Fraction of installed capacity used as the default production limit.
///
/// Empirical; no derivation is known.
pub const DEFAULT_LIMIT_FRACTION: f64 = 0.1;

// ============================================================================
// Fine Grid
// ============================================================================

/// Grid step when the production series has no usable spacing (seconds).
pub const DEFAULT_GRID_STEP_SECS: i64 = 240;

// ============================================================================
// Breakpoints & Estimators
// ============================================================================

/// Half-width of the breakpoint validation window (minutes).
pub const DEFAULT_JUMP_MINUTES: u32 = 60;

/// Half-width of the price neutralisation window around validated breakpoints (minutes).
pub const NOISE_WINDOW_MINUTES: i64 = 59;

/// Trailing window ignored by the minimum method (minutes).
pub const DEFAULT_DISCARD_END_MINUTES: u32 = 60;

// ============================================================================
// History
// ============================================================================

/// Maximum number of days re-evaluated for the water value history.
pub const HISTORY_MAX_POINTS: usize = 60;

/// Number of evenly spaced limits generated for plants without explicit limits.
pub const DEFAULT_PLANT_SEGMENTS: usize = 4;

// ============================================================================
// Time
// ============================================================================

pub const SECS_PER_MINUTE: i64 = 60;
pub const SECS_PER_DAY: i64 = 86_400;
