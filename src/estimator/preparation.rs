//! Series Preparation
//!
//! Turns caller-supplied parallel arrays into clean series: integer epoch
//! seconds, optional snapping of production timestamps, same-instant
//! samples averaged, ascending order.

use std::collections::BTreeMap;

use crate::config::defaults::{MIN_PRODUCTION_SAMPLES, MIN_PRODUCTION_SPAN_SECS};
use crate::types::{RawSeries, TimeSeries, WaterValueError};

/// Input validator and normaliser
pub struct SeriesPreparer;

impl SeriesPreparer {
    /// Validate and normalise one series.
    ///
    /// `snap_seconds > 0` floors every timestamp to a multiple of it before
    /// deduplication. Fractional seconds are truncated.
    pub fn prepare(
        raw: &RawSeries,
        name: &str,
        snap_seconds: u32,
    ) -> Result<TimeSeries, WaterValueError> {
        if raw.timestamps.len() != raw.values.len() {
            return Err(WaterValueError::InvalidInput(format!(
                "{name}: {} values but {} timestamps",
                raw.values.len(),
                raw.timestamps.len()
            )));
        }
        if raw.is_empty() {
            return Err(WaterValueError::InvalidInput(format!(
                "{name}: no samples supplied"
            )));
        }
        if let Some(pos) = raw.timestamps.iter().position(|t| !t.is_finite()) {
            return Err(WaterValueError::InvalidInput(format!(
                "{name}: non-finite timestamp at position {pos}"
            )));
        }
        if let Some(pos) = raw.values.iter().position(|v| !v.is_finite()) {
            return Err(WaterValueError::InvalidInput(format!(
                "{name}: non-finite value at position {pos}"
            )));
        }

        let snap = i64::from(snap_seconds);
        let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        for (t, v) in raw.timestamps.iter().zip(raw.values.iter()) {
            // `as` saturates out-of-range floats; epoch seconds never get there
            let mut ts = *t as i64;
            if snap > 0 {
                ts = ts.div_euclid(snap) * snap;
            }
            let entry = buckets.entry(ts).or_insert((0.0, 0));
            entry.0 += *v;
            entry.1 += 1;
        }

        let (timestamps, values) = buckets
            .into_iter()
            .map(|(ts, (sum, count))| (ts, sum / count as f64))
            .unzip();
        Ok(TimeSeries::from_sorted_unique(timestamps, values))
    }

    /// Enough production history to segment: at least 10 samples over at
    /// least 3 hours.
    pub fn ensure_sufficient(production: &TimeSeries) -> Result<(), WaterValueError> {
        if production.len() < MIN_PRODUCTION_SAMPLES {
            return Err(WaterValueError::InsufficientSamples {
                required: MIN_PRODUCTION_SAMPLES,
                actual: production.len(),
            });
        }
        let span = production.span_seconds();
        if span < MIN_PRODUCTION_SPAN_SECS {
            return Err(WaterValueError::InsufficientSpan {
                required_secs: MIN_PRODUCTION_SPAN_SECS,
                actual_secs: span,
            });
        }
        Ok(())
    }
}
