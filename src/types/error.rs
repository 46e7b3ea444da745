//! Error type for water value estimation.

use thiserror::Error;

/// Failures detected before any estimation work begins.
///
/// Missing evidence (an empty window, a level with no validated breakpoint)
/// is never an error: it shows up as NaN in the result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaterValueError {
    #[error("Not enough input data: required {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Not enough input data: required time span {required_secs} seconds, got {actual_secs} seconds")]
    InsufficientSpan { required_secs: i64, actual_secs: i64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WaterValueError {
    /// True for both flavours of "not enough data" (sample count or span).
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientSamples { .. } | Self::InsufficientSpan { .. }
        )
    }

    /// True when the configuration itself was rejected.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}
