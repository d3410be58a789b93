//! Main application configuration
//!
//! This module defines the configuration used by the `glicko-engine` binary,
//! including environment variable loading, TOML files and validation.

use crate::config::rating::GlickoConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub glicko: GlickoConfig,
    pub period: PeriodSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Rating period settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSettings {
    /// Grow the deviation of registered players who played no games in the period
    pub decay_inactive: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "glicko-engine".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self {
            decay_inactive: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Replace the glicko section with a settings file, created with defaults when missing
    ///
    /// Environment variables are applied again afterwards, so the order of precedence is
    /// `[glicko]` section < settings file < environment.
    pub fn with_settings_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.glicko = GlickoConfig::load_or_create(path)?;
        self.apply_env()?;
        validate_config(&self)?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        // Service settings
        if let Some(name) = lookup("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Glicko tunables
        override_from(&lookup, "GLICKO_DEFAULT_RATING", &mut self.glicko.default_rating)?;
        override_from(&lookup, "GLICKO_DEFAULT_DEVIATION", &mut self.glicko.default_deviation)?;
        override_from(&lookup, "GLICKO_DEFAULT_VOLATILITY", &mut self.glicko.default_volatility)?;
        override_from(&lookup, "GLICKO_SCALE", &mut self.glicko.scale)?;
        override_from(&lookup, "GLICKO_TAU", &mut self.glicko.system_constant)?;
        override_from(&lookup, "GLICKO_CONVERGENCE", &mut self.glicko.convergence)?;
        override_from(&lookup, "GLICKO_MAX_ITERATIONS", &mut self.glicko.max_iterations)?;

        // Rating period settings
        override_from(&lookup, "DECAY_INACTIVE", &mut self.period.decay_inactive)?;

        Ok(())
    }
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<()> {
    if let Some(raw) = lookup(key) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, raw))?;
    }
    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.glicko.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert!(config.period.decay_inactive);
        assert_eq!(config.glicko, GlickoConfig::default());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_glicko_section() {
        let mut config = AppConfig::default();
        config.glicko.system_constant = -0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_toml_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [service]
            log_level = "debug"

            [glicko]
            system_constant = 1.2

            [period]
            decay_inactive = false
            "#,
        )
        .unwrap();

        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.service.name, "glicko-engine");
        assert_eq!(config.glicko.system_constant, 1.2);
        assert_eq!(config.glicko.scale, 173.7178);
        assert!(!config.period.decay_inactive);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.glicko.system_constant = 0.9;

        config
            .apply_overrides(|key| match key {
                "GLICKO_TAU" => Some("1.1".to_string()),
                "DECAY_INACTIVE" => Some("false".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.glicko.system_constant, 1.1);
        assert!(!config.period.decay_inactive);

        let result = config.apply_overrides(|key| {
            (key == "GLICKO_MAX_ITERATIONS").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_file_replaces_glicko_section() {
        let dir = std::env::temp_dir().join(format!("glicko-engine-app-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("glicko.toml");
        fs::write(&path, "system_constant = 0.8\n").unwrap();

        let mut config = AppConfig::default();
        config.glicko.default_rating = 1200.0;
        let config = config.with_settings_file(&path).unwrap();

        // Nothing in the test environment sets GLICKO_TAU
        if env::var("GLICKO_TAU").is_err() {
            assert_eq!(config.glicko.system_constant, 0.8);
        }
        if env::var("GLICKO_DEFAULT_RATING").is_err() {
            assert_eq!(config.glicko.default_rating, 1500.0);
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
