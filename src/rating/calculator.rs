//! Rating calculator trait and the Glicko-2 implementation
//!
//! The calculator owns one [`GlickoConfig`] so callers do not need to thread
//! the tunables through every call.

use crate::config::GlickoConfig;
use crate::error::{RatingError, Result};
use crate::rating::glicko2::{expected_score, g, Match, PendingRating, Rating};
use crate::types::PlayerRating;
use tracing::debug;

/// Trait for computing rating updates
pub trait RatingCalculator: Send + Sync {
    /// Compute pending values for a player from one or more matches
    fn calculate_update(&self, rating: &Rating, matches: &[Match<'_>]) -> Result<PendingRating>;

    /// Compute pending values for a player who did not compete
    fn calculate_decay(&self, rating: &Rating) -> PendingRating;

    /// Get the initial rating for new players
    fn initial_rating(&self) -> Result<Rating>;

    /// Convert a rating to the display scale
    fn display(&self, rating: &Rating) -> PlayerRating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> Result<()>;
}

/// Glicko-2 rating calculator
#[derive(Debug, Clone)]
pub struct Glicko2RatingCalculator {
    config: GlickoConfig,
}

impl Default for Glicko2RatingCalculator {
    fn default() -> Self {
        Self {
            config: GlickoConfig::default(),
        }
    }
}

impl Glicko2RatingCalculator {
    /// Create a new Glicko-2 rating calculator
    pub fn new(config: GlickoConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn glicko_config(&self) -> &GlickoConfig {
        &self.config
    }

    /// Build a rating from display-scale values
    pub fn rating_from_display(
        &self,
        rating: f64,
        deviation: f64,
        volatility: f64,
    ) -> Result<Rating> {
        Rating::from_display(rating, deviation, volatility, &self.config)
    }

    pub fn rating_from_player(&self, rating: &PlayerRating) -> Result<Rating> {
        Rating::from_player_rating(rating, &self.config)
    }

    /// Win probability of `rating` against `opponent`
    pub fn expected_score(&self, rating: &Rating, opponent: &Rating) -> f64 {
        expected_score(g(opponent.phi()), rating.mu(), opponent.mu())
    }
}

impl RatingCalculator for Glicko2RatingCalculator {
    fn calculate_update(&self, rating: &Rating, matches: &[Match<'_>]) -> Result<PendingRating> {
        let pending = rating.update(matches, &self.config)?;
        debug!(
            matches = matches.len(),
            mu = pending.mu,
            phi = pending.phi,
            sigma = pending.sigma,
            "computed pending rating"
        );
        Ok(pending)
    }

    fn calculate_decay(&self, rating: &Rating) -> PendingRating {
        rating.decay()
    }

    fn initial_rating(&self) -> Result<Rating> {
        Rating::new(&self.config)
    }

    fn display(&self, rating: &Rating) -> PlayerRating {
        rating.to_display(&self.config)
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> Result<()> {
        let new_config: GlickoConfig =
            serde_json::from_value(config).map_err(|e| RatingError::ConfigurationError {
                message: format!("Invalid Glicko configuration: {}", e),
            })?;

        new_config.validate()?;
        self.config = new_config;
        Ok(())
    }
}
