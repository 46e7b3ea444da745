//! File-level configuration: base estimator options plus the plant registry.
//!
//! ```toml
//! [estimator]
//! strictness = 0.5
//! method = "minimum"
//!
//! [[plants]]
//! id = "saurdal"
//! name = "Saurdal kraftverk"
//! price_area = "NO2"
//! max_installed = 640.0
//! prod_limits = [0.0, 25.0, 40.0, 55.0, 75.0]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::DEFAULT_PLANT_SEGMENTS;
use super::EstimatorConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "WATERVALUE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "watervalue.toml";

// ============================================================================
// App Config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Options shared by every plant; per-plant limits override them.
    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub plants: Vec<PlantConfig>,
}

impl AppConfig {
    /// Load configuration from the first usable source:
    /// 1. `$WATERVALUE_CONFIG` environment variable
    /// 2. `./watervalue.toml` in the current working directory
    /// 3. Built-in defaults (no plants)
    ///
    /// A source that is missing or fails to load is logged and skipped.
    pub fn load() -> Self {
        for (path, source) in Self::config_sources() {
            if !path.exists() {
                if source == CONFIG_ENV_VAR {
                    warn!(path = %path.display(), "{CONFIG_ENV_VAR} names a missing file, skipping");
                }
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        source,
                        plants = config.plants.len(),
                        "Config loaded"
                    );
                    return config;
                }
                Err(e) => warn!(path = %path.display(), source, error = %e, "Config rejected, trying next source"),
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Candidate config files in priority order, tagged with their origin.
    fn config_sources() -> Vec<(PathBuf, &'static str)> {
        let mut sources = Vec::with_capacity(2);
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            sources.push((PathBuf::from(path), CONFIG_ENV_VAR));
        }
        sources.push((PathBuf::from(LOCAL_CONFIG_FILE), "working directory"));
        sources
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Typos only warn; serde decides what is actually fatal.
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Look up a plant by id.
    pub fn plant(&self, id: &str) -> Option<&PlantConfig> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// Validate the base options and every plant.
    ///
    /// The base estimator may omit limits entirely since each plant
    /// supplies its own; a plant's derived config must be complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = self
            .estimator
            .option_errors()
            .into_iter()
            .map(|e| format!("estimator: {e}"))
            .collect();

        if self.estimator.prod_limits.is_some() || self.estimator.max_installed.is_some() {
            errors.extend(
                self.estimator
                    .limit_errors()
                    .into_iter()
                    .map(|e| format!("estimator: {e}")),
            );
        }

        let mut seen = HashSet::new();
        for plant in &self.plants {
            if plant.id.trim().is_empty() {
                errors.push(format!("plant '{}' has an empty id", plant.name));
                continue;
            }
            if !seen.insert(plant.id.as_str()) {
                errors.push(format!("duplicate plant id '{}'", plant.id));
            }
            if !plant.max_installed.is_finite() || plant.max_installed <= 0.0 {
                errors.push(format!(
                    "plants.{}: max_installed must be > 0, got {}",
                    plant.id, plant.max_installed
                ));
                continue;
            }
            let derived = plant.estimator_config(&self.estimator);
            errors.extend(
                derived
                    .limit_errors()
                    .into_iter()
                    .map(|e| format!("plants.{}: {e}", plant.id)),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Plant Config
// ============================================================================

/// One hydropower plant (or a combined group of units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfig {
    pub id: String,
    pub name: String,
    /// Bidding zone the plant sells into (e.g. "NO5")
    #[serde(default)]
    pub price_area: Option<String>,
    /// Installed capacity (MW)
    pub max_installed: f64,
    /// Explicit interval limits (MW); generated from capacity when empty
    #[serde(default, alias = "prodlimits")]
    pub prod_limits: Vec<f64>,
}

impl PlantConfig {
    /// Configured limits, or `segments` evenly spaced limits from 0 to capacity.
    ///
    /// Generated limits are rounded to 3 decimals, start at 0 and end exactly
    /// at the rounded capacity.
    pub fn resolved_prod_limits(&self, segments: usize) -> Vec<f64> {
        if !self.prod_limits.is_empty() {
            return self.prod_limits.clone();
        }
        if segments == 0 {
            return vec![self.max_installed];
        }

        let step = self.max_installed / segments as f64;
        let mut limits: Vec<f64> = (0..=segments)
            .map(|idx| round3(step * idx as f64))
            .collect();
        limits[0] = 0.0;
        limits[segments] = round3(self.max_installed);
        if limits.len() > 1 && limits[1] == 0.0 {
            limits[1] = round3(step);
        }
        limits
    }

    /// Estimator options for this plant: the base options with the plant's
    /// limits and capacity filled in. Pumping is not modelled per plant.
    pub fn estimator_config(&self, base: &EstimatorConfig) -> EstimatorConfig {
        EstimatorConfig {
            prod_limits: Some(self.resolved_prod_limits(DEFAULT_PLANT_SEGMENTS)),
            max_installed: Some(self.max_installed),
            negative_prod: false,
            ..base.clone()
        }
    }
}

fn round3(x: f64) -> f64 {
    (x * 1_000.0).round() / 1_000.0
}

// ============================================================================
// Error Type
// ============================================================================

/// Problems reading, writing or checking a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML in {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("config validation failed:{}", bullet_list(.0))]
    Validation(Vec<String>),
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\n  - {item}")).collect()
}
