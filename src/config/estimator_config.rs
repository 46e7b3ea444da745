//! Estimator options - every knob of a single estimation call.
//!
//! Field names follow Rust conventions; the short option names
//! (`prodlimits`, `estmethod`, `jumpm`, ...) are accepted as serde aliases
//! so existing parameter files keep working.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::defaults::{
    DEFAULT_DISCARD_END_MINUTES, DEFAULT_JUMP_MINUTES, DEFAULT_SNAP_SECS, DEFAULT_STRICTNESS,
};
use crate::types::WaterValueError;

// ============================================================================
// Estimation Method
// ============================================================================

/// Which interval estimator turns validated breakpoints into bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMethod {
    /// Min/max prices observed while production stayed in (or below) an interval
    #[default]
    Minimum,
    /// Price excursion across validated transitions on the final day
    Jump,
}

impl EstimationMethod {
    pub const ALL: [Self; 2] = [Self::Minimum, Self::Jump];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimum => "minimum",
            Self::Jump => "jump",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimationMethod {
    type Err = WaterValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimum" => Ok(Self::Minimum),
            "jump" => Ok(Self::Jump),
            other => Err(WaterValueError::InvalidConfig(format!(
                "estmethod must be 'minimum' or 'jump', got '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Estimator Config
// ============================================================================

/// Options for one estimation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Explicit, strictly increasing production interval limits (MW).
    /// When absent they are derived from `max_installed`.
    #[serde(default, alias = "prodlimits")]
    pub prod_limits: Option<Vec<f64>>,

    /// Plant can consume power (pumping); adds a symmetric negative limit.
    #[serde(default, alias = "negativeprod")]
    pub negative_prod: bool,

    /// Installed capacity (MW); required when `prod_limits` is absent.
    #[serde(default, alias = "maxinstalled")]
    pub max_installed: Option<f64>,

    /// Curvature threshold in (0, 1] for automatic segment-count selection.
    #[serde(default = "default_strictness")]
    pub strictness: f64,

    #[serde(default, alias = "estmethod")]
    pub method: EstimationMethod,

    /// Report `[lower, upper]` per interval instead of a point estimate.
    #[serde(default = "default_interval_output", alias = "estinterval")]
    pub interval_output: bool,

    /// Breakpoint validation half-window (minutes).
    #[serde(default = "default_jump_minutes", alias = "jumpm")]
    pub jump_minutes: u32,

    /// Fixed segment count; automatic selection when absent.
    #[serde(default, alias = "nsegments")]
    pub segment_count: Option<usize>,

    /// Trailing minutes ignored by the minimum method.
    #[serde(default = "default_discard_end_minutes", alias = "discardend")]
    pub discard_end_minutes: u32,

    /// Production timestamps are floored to this multiple (seconds); 0 disables.
    #[serde(default = "default_snap_seconds")]
    pub snap_seconds: u32,
}

fn default_strictness() -> f64 {
    DEFAULT_STRICTNESS
}
fn default_interval_output() -> bool {
    true
}
fn default_jump_minutes() -> u32 {
    DEFAULT_JUMP_MINUTES
}
fn default_discard_end_minutes() -> u32 {
    DEFAULT_DISCARD_END_MINUTES
}
fn default_snap_seconds() -> u32 {
    DEFAULT_SNAP_SECS
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            prod_limits: None,
            negative_prod: false,
            max_installed: None,
            strictness: default_strictness(),
            method: EstimationMethod::default(),
            interval_output: default_interval_output(),
            jump_minutes: default_jump_minutes(),
            segment_count: None,
            discard_end_minutes: default_discard_end_minutes(),
            snap_seconds: default_snap_seconds(),
        }
    }
}

impl EstimatorConfig {
    /// Config with explicit limits and defaults for everything else.
    pub fn with_limits(prod_limits: Vec<f64>) -> Self {
        Self {
            prod_limits: Some(prod_limits),
            ..Self::default()
        }
    }

    /// Check everything that can be checked without looking at the data.
    ///
    /// The segment-count upper bound depends on the sample count and is
    /// checked again once the series is prepared.
    pub fn validate(&self) -> Result<(), WaterValueError> {
        let mut errors = self.option_errors();
        errors.extend(self.limit_errors());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(WaterValueError::InvalidConfig(errors.join("; ")))
        }
    }

    /// Problems with the options that do not concern production limits.
    pub(crate) fn option_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.strictness.is_finite() || self.strictness <= 0.0 || self.strictness > 1.0 {
            errors.push(format!(
                "strictness must be in (0, 1], got {}",
                self.strictness
            ));
        }

        if self.segment_count == Some(0) {
            errors.push("nsegments must be at least 1".to_string());
        }

        errors
    }

    /// Problems with explicit limits, or with the capacity they default from.
    pub(crate) fn limit_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match &self.prod_limits {
            Some(limits) => {
                if limits.is_empty() {
                    errors.push("prodlimits must contain at least one limit".to_string());
                } else if limits.iter().any(|l| !l.is_finite()) {
                    errors.push("prodlimits must be finite numbers".to_string());
                } else if limits.windows(2).any(|w| w[1] <= w[0]) {
                    errors.push(format!(
                        "prodlimits must be strictly increasing, got {limits:?}"
                    ));
                }
            }
            None => match self.max_installed {
                Some(max) if max.is_finite() && max > 0.0 => {}
                Some(max) => errors.push(format!(
                    "maxinstalled must be a positive finite number, got {max}"
                )),
                None => errors
                    .push("maxinstalled is required when prodlimits is not supplied".to_string()),
            },
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.strictness, 0.5);
        assert_eq!(config.method, EstimationMethod::Minimum);
        assert!(config.interval_output);
        assert_eq!(config.jump_minutes, 60);
        assert_eq!(config.discard_end_minutes, 60);
        assert_eq!(config.snap_seconds, 240);
        assert!(config.segment_count.is_none());
    }

    #[test]
    fn test_default_requires_capacity_or_limits() {
        let err = EstimatorConfig::default().validate().unwrap_err();
        assert!(err.is_invalid_config());
        assert!(err.to_string().contains("maxinstalled"));

        let config = EstimatorConfig {
            max_installed: Some(640.0),
            ..EstimatorConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_increasing_limits_rejected() {
        let config = EstimatorConfig::with_limits(vec![10.0, 10.0, 20.0]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_strictness_range() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let config = EstimatorConfig {
                strictness: bad,
                ..EstimatorConfig::with_limits(vec![50.0])
            };
            assert!(config.validate().is_err(), "strictness {bad} should fail");
        }
        let config = EstimatorConfig {
            strictness: 1.0,
            ..EstimatorConfig::with_limits(vec![50.0])
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_segments_rejected() {
        let config = EstimatorConfig {
            segment_count: Some(0),
            ..EstimatorConfig::with_limits(vec![50.0])
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("jump".parse::<EstimationMethod>(), Ok(EstimationMethod::Jump));
        assert_eq!(" Minimum ".parse::<EstimationMethod>(), Ok(EstimationMethod::Minimum));
        let err = "median".parse::<EstimationMethod>().unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_short_option_names_accepted() {
        let toml_str = r#"
prodlimits = [0.0, 200.0, 400.0]
estmethod = "jump"
estinterval = false
jumpm = 30
nsegments = 5
discardend = 120
"#;
        let config: EstimatorConfig = toml::from_str(toml_str).expect("aliases should parse");
        assert_eq!(config.prod_limits, Some(vec![0.0, 200.0, 400.0]));
        assert_eq!(config.method, EstimationMethod::Jump);
        assert!(!config.interval_output);
        assert_eq!(config.jump_minutes, 30);
        assert_eq!(config.segment_count, Some(5));
        assert_eq!(config.discard_end_minutes, 120);
    }

    #[test]
    fn test_unknown_method_fails_to_parse() {
        let result: Result<EstimatorConfig, _> = toml::from_str("method = \"median\"");
        assert!(result.is_err());
    }
}
