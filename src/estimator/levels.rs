//! Production levels: limits and discretisation of segment means.

use crate::config::defaults::DEFAULT_LIMIT_FRACTION;
use crate::config::EstimatorConfig;
use crate::types::WaterValueError;

/// Maps segment means onto production intervals
pub struct LevelDiscretizer;

impl LevelDiscretizer {
    /// Limits used for this call.
    ///
    /// Explicit limits must be strictly increasing. Without them the single
    /// limit `0.1 × max_installed` is used, mirrored below zero for plants
    /// that can pump.
    pub fn resolve_limits(config: &EstimatorConfig) -> Result<Vec<f64>, WaterValueError> {
        let errors = config.limit_errors();
        if !errors.is_empty() {
            return Err(WaterValueError::InvalidConfig(errors.join("; ")));
        }

        if let Some(limits) = &config.prod_limits {
            return Ok(limits.clone());
        }

        let max_installed = config.max_installed.ok_or_else(|| {
            WaterValueError::InvalidConfig(
                "maxinstalled is required when prodlimits is not supplied".to_string(),
            )
        })?;
        let upper = DEFAULT_LIMIT_FRACTION * max_installed;
        if config.negative_prod {
            Ok(vec![-upper, upper])
        } else {
            Ok(vec![upper])
        }
    }

    /// Interval index of every mean for the bins `(-inf, l₁], (l₁, l₂], …, (lₙ, +inf)`.
    ///
    /// Level 0 lies at or below the first limit and carries no water value.
    pub fn discretize(level_means: &[f64], limits: &[f64]) -> Vec<usize> {
        level_means
            .iter()
            .map(|mean| limits.partition_point(|limit| limit < mean))
            .collect()
    }
}
