//! Configuration
//!
//! Estimator options for a single call plus an optional TOML file carrying
//! shared options and the plant registry.
//!
//! ## Loading Order
//!
//! 1. `WATERVALUE_CONFIG` environment variable (path to TOML file)
//! 2. `watervalue.toml` in the current working directory
//! 3. Built-in defaults (no plants)
//!
//! Configs are plain values passed into each call; there is no global
//! instance.
//!
//! ```ignore
//! let app = AppConfig::load();
//! let plant = app.plant("saurdal").context("unknown plant")?;
//! let config = plant.estimator_config(&app.estimator);
//! ```

mod app_config;
pub mod defaults;
mod estimator_config;
pub mod validation;

pub use app_config::*;
pub use estimator_config::*;
