//! Glicko Engine - Glicko-2 skill ratings
//!
//! This crate computes rating, deviation and volatility updates with the
//! Glicko-2 method, including the iterative volatility solver, and processes
//! rating periods in two phases so that no update observes another player's
//! uncommitted values.

pub mod config;
pub mod error;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use config::GlickoConfig;
pub use rating::{
    Glicko2RatingCalculator, Match, PendingRating, Rating, RatingCalculator, RatingPeriod,
    StagedRating,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
