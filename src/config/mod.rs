//! Configuration management for the rating engine
//!
//! This module handles the Glicko-2 tunables and the application settings
//! loaded from environment variables and TOML files.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, PeriodSettings, ServiceSettings};
pub use rating::GlickoConfig;
