//! Rating storage interface and implementations
//!
//! This module defines the interface for keeping player ratings between
//! rating periods, with an in-memory implementation.

use crate::error::{RatingError, Result};
use crate::rating::glicko2::Rating;
use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage entry for a player's rating with match tallies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEntry {
    pub player_id: PlayerId,
    pub rating: Rating,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RatingEntry {
    /// Create a new rating entry for a new player
    pub fn new(player_id: PlayerId, initial_rating: Rating) -> Self {
        let now = Utc::now();
        Self {
            player_id,
            rating: initial_rating,
            wins: 0,
            losses: 0,
            draws: 0,
            last_updated: now,
            created_at: now,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Wins plus half the draws
    pub fn score(&self) -> f64 {
        f64::from(self.wins) + 0.5 * f64::from(self.draws)
    }

    /// Count one game with an already clamped score
    pub fn record_result(&mut self, score: f64) {
        if score >= 1.0 {
            self.wins += 1;
        } else if score <= 0.0 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }

    /// Replace the rating and touch the update timestamp
    pub fn update_rating(&mut self, new_rating: Rating) {
        self.rating = new_rating;
        self.last_updated = Utc::now();
    }
}

/// Trait for rating storage operations
pub trait RatingStorage: Send + Sync {
    /// Get a player's rating entry
    fn get_rating(&self, player_id: &PlayerId) -> Result<Option<RatingEntry>>;

    /// Store or update a player's rating
    fn store_rating(&self, entry: RatingEntry) -> Result<()>;

    /// Get ratings for multiple players
    fn get_ratings(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, RatingEntry>>;

    /// Store multiple rating updates atomically
    fn store_ratings(&self, entries: Vec<RatingEntry>) -> Result<()>;

    /// Get all players with ratings
    fn get_all_ratings(&self) -> Result<HashMap<PlayerId, RatingEntry>>;

    /// Remove a player's rating
    fn remove_rating(&self, player_id: &PlayerId) -> Result<bool>;

    /// Get total number of rated players
    fn get_player_count(&self) -> Result<usize>;
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStorage {
    ratings: RwLock<HashMap<PlayerId, RatingEntry>>,
}

impl InMemoryRatingStorage {
    /// Create a new in-memory rating storage
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<PlayerId, RatingEntry>>> {
        self.ratings.read().map_err(|_| RatingError::InternalError {
            message: "Failed to acquire ratings read lock".to_string(),
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<PlayerId, RatingEntry>>> {
        self.ratings.write().map_err(|_| RatingError::InternalError {
            message: "Failed to acquire ratings write lock".to_string(),
        })
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn get_rating(&self, player_id: &PlayerId) -> Result<Option<RatingEntry>> {
        Ok(self.read()?.get(player_id).cloned())
    }

    fn store_rating(&self, entry: RatingEntry) -> Result<()> {
        self.write()?.insert(entry.player_id.clone(), entry);
        Ok(())
    }

    fn get_ratings(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, RatingEntry>> {
        let ratings = self.read()?;

        let mut result = HashMap::new();
        for player_id in player_ids {
            if let Some(entry) = ratings.get(player_id) {
                result.insert(player_id.clone(), entry.clone());
            }
        }

        Ok(result)
    }

    fn store_ratings(&self, entries: Vec<RatingEntry>) -> Result<()> {
        let mut ratings = self.write()?;
        for entry in entries {
            ratings.insert(entry.player_id.clone(), entry);
        }
        Ok(())
    }

    fn get_all_ratings(&self) -> Result<HashMap<PlayerId, RatingEntry>> {
        Ok(self.read()?.clone())
    }

    fn remove_rating(&self, player_id: &PlayerId) -> Result<bool> {
        Ok(self.write()?.remove(player_id).is_some())
    }

    fn get_player_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
