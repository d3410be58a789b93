//! Glicko-2 rating system
//!
//! This module provides the rating model and its volatility solver, the
//! staged update cycle, a calculator facade, storage interfaces and
//! two-phase rating period processing.

pub mod calculator;
pub mod glicko2;
pub mod period;
pub mod staged;
pub mod storage;
pub mod volatility;

// Re-export commonly used types
pub use calculator::{Glicko2RatingCalculator, RatingCalculator};
pub use glicko2::{clamp_score, expected_score, g, Match, PendingRating, Rating};
pub use period::RatingPeriod;
pub use staged::StagedRating;
pub use storage::{InMemoryRatingStorage, RatingEntry, RatingStorage};
pub use volatility::{Bracket, VolatilityInputs, VolatilitySolver};
