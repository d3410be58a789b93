//! Rating system configuration
//!
//! Holds the Glicko-2 tunables shared by every rating. One value is obtained
//! per process (or per rating system instance) and passed explicitly to the
//! engine; [`GlickoConfig::load_or_create`] is the get-or-initialize accessor
//! backed by a TOML settings file.

use crate::error::{RatingError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Glicko-2 tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlickoConfig {
    /// Initial display-scale rating, also the centre of the internal scale
    pub default_rating: f64,
    /// Initial display-scale deviation
    pub default_deviation: f64,
    /// Initial volatility
    pub default_volatility: f64,
    /// Glicko-1 to Glicko-2 scale factor
    pub scale: f64,
    /// System constant (tau), constrains the change in volatility
    pub system_constant: f64,
    /// Convergence tolerance (epsilon) for the volatility solver
    pub convergence: f64,
    /// Upper bound on solver steps, for both the bracket search and the root iteration
    pub max_iterations: u32,
}

impl Default for GlickoConfig {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            default_deviation: 350.0,
            default_volatility: 0.06,
            scale: 173.7178,
            system_constant: 0.5,
            convergence: 0.000001,
            max_iterations: 10_000,
        }
    }
}

impl GlickoConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.default_rating.is_finite() {
            return Err(config_error("Default rating must be finite"));
        }
        if !is_positive(self.default_deviation) {
            return Err(config_error("Default deviation must be positive"));
        }
        if !is_positive(self.default_volatility) {
            return Err(config_error("Default volatility must be positive"));
        }
        if !is_positive(self.scale) {
            return Err(config_error("Scale factor must be positive"));
        }
        if !is_positive(self.system_constant) {
            return Err(config_error("System constant (tau) must be positive"));
        }
        if !is_positive(self.convergence) {
            return Err(config_error("Convergence tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(config_error("Max iterations must be greater than 0"));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: GlickoConfig =
            toml::from_str(contents).context("Invalid Glicko settings document")?;
        config.validate()?;
        Ok(config)
    }

    /// Load the settings file at `path`, or write the defaults there if it does not exist yet
    pub fn load_or_create(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read Glicko settings {}", path.display()))?;
            return Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to load Glicko settings {}", path.display()));
        }

        let config = Self::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(&config).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write Glicko settings {}", path.display()))?;

        info!("Created default Glicko settings at {}", path.display());
        Ok(config)
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn config_error(message: &str) -> RatingError {
    RatingError::ConfigurationError {
        message: message.to_string(),
    }
}
