//! Breakpoint Validation
//!
//! A segment boundary is trusted only if production level and price moved
//! in the same direction across the surrounding window.

use std::ops::RangeInclusive;

use tracing::debug;

use super::fine_grid::FineGrid;
use crate::config::defaults::SECS_PER_MINUTE;
use crate::types::{BreakpointFlag, TimeSeries};

/// A boundary confirmed by joint price/production movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBreakpoint {
    /// Index into the prepared production series
    pub sample: usize,
    /// Timestamp of that sample (epoch seconds)
    pub timestamp: i64,
    /// Fine-grid indices of the validation window
    pub window: RangeInclusive<usize>,
}

/// Outcome of validating every candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointValidation {
    /// Input flags with confirmed candidates promoted to `Validated`
    pub flags: Vec<BreakpointFlag>,
    /// Confirmed boundaries in time order
    pub validated: Vec<ValidatedBreakpoint>,
    pub candidate_count: usize,
}

/// Joint-movement filter for segment boundaries
pub struct BreakpointValidator;

impl BreakpointValidator {
    /// Check each candidate against the `±jump_minutes` window of the grid.
    ///
    /// A candidate is promoted when `(price_end − price_start) ×
    /// (level_end − level_start) > 0`. Empty windows, opposite moves and
    /// flat windows leave it a candidate.
    pub fn validate(
        production: &TimeSeries,
        flags: &[BreakpointFlag],
        grid: &FineGrid,
        jump_minutes: u32,
    ) -> BreakpointValidation {
        let half_width = i64::from(jump_minutes) * SECS_PER_MINUTE;
        let mut updated = flags.to_vec();
        let mut validated = Vec::new();
        let mut candidate_count = 0;

        for (sample, (flag, &timestamp)) in flags
            .iter()
            .zip(production.timestamps())
            .enumerate()
        {
            if !flag.is_boundary() {
                continue;
            }
            candidate_count += 1;

            let Some(window) = grid.window(timestamp, half_width) else {
                continue;
            };
            let (first, last) = (*window.start(), *window.end());
            let price_change = grid.prices[last] - grid.prices[first];
            let level_change = grid.levels[last] as f64 - grid.levels[first] as f64;

            if price_change * level_change > 0.0 {
                updated[sample] = BreakpointFlag::Validated;
                validated.push(ValidatedBreakpoint {
                    sample,
                    timestamp,
                    window,
                });
            }
        }

        debug!(
            candidates = candidate_count,
            validated = validated.len(),
            "Breakpoints validated"
        );

        BreakpointValidation {
            flags: updated,
            validated,
            candidate_count,
        }
    }
}
