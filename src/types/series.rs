//! Input and prepared time series.

use serde::{Deserialize, Serialize};

/// Parallel arrays of epoch-second timestamps and values, exactly as handed
/// over by the caller. Nothing is validated until preparation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Epoch seconds (fractional seconds are truncated during preparation)
    pub timestamps: Vec<f64>,
    /// Sample values (MW for production, currency/MWh for price)
    pub values: Vec<f64>,
}

impl RawSeries {
    pub fn new(timestamps: Vec<f64>, values: Vec<f64>) -> Self {
        Self { timestamps, values }
    }

    /// Number of timestamps supplied.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Keep only the samples strictly before `cutoff` (epoch seconds).
    ///
    /// Pairs are taken positionally; trailing values without a timestamp
    /// (or vice versa) are dropped.
    pub fn before(&self, cutoff: f64) -> Self {
        let (timestamps, values) = self
            .timestamps
            .iter()
            .zip(self.values.iter())
            .filter(|(t, _)| **t < cutoff)
            .map(|(t, v)| (*t, *v))
            .unzip();
        Self { timestamps, values }
    }
}

/// A cleaned series: integer epoch seconds, strictly increasing, finite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    timestamps: Vec<i64>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Caller guarantees strictly increasing timestamps and equal lengths.
    pub(crate) fn from_sorted_unique(timestamps: Vec<i64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        debug_assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
        Self { timestamps, values }
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    /// Seconds between first and last sample (0 for fewer than two samples).
    pub fn span_seconds(&self) -> i64 {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    /// Smallest gap between consecutive samples.
    pub fn min_spacing(&self) -> Option<i64> {
        self.timestamps.windows(2).map(|w| w[1] - w[0]).min()
    }
}
