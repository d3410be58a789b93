//! Common types used throughout the rating engine

use crate::config::GlickoConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for rated players
pub type PlayerId = String;

/// Rating information for a player on the public display (Glicko-1) scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl From<&GlickoConfig> for PlayerRating {
    /// Starting rating for a new player under `config`
    fn from(config: &GlickoConfig) -> Self {
        Self {
            rating: config.default_rating,
            deviation: config.default_deviation,
            volatility: config.default_volatility,
        }
    }
}

impl fmt::Display for PlayerRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[µ{}:φ{}]", self.rating, self.deviation)
    }
}

/// Outcome of a single game, scored from `player_id`'s point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub player_id: PlayerId,
    pub opponent_id: PlayerId,
    /// 1.0 win, 0.5 draw, 0.0 loss. Other values are clamped when the match is built.
    pub score: f64,
}

impl GameResult {
    pub fn new(player_id: impl Into<PlayerId>, opponent_id: impl Into<PlayerId>, score: f64) -> Self {
        Self {
            player_id: player_id.into(),
            opponent_id: opponent_id.into(),
            score,
        }
    }
}

/// Rating change information for a player after a rating period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub old_rating: PlayerRating,
    pub new_rating: PlayerRating,
    /// Display-scale change in rating from this commit
    pub delta: f64,
    /// Games counted for this player in the period; zero means the rating decayed
    pub games: usize,
}
