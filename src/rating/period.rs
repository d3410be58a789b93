//! Rating period processing
//!
//! Game results are collected for a period and then processed in two phases.
//! The read phase computes a pending rating for every participant against one
//! snapshot of committed ratings, so no player ever sees an opponent's value
//! from the same period. The commit phase applies every pending value and
//! stores the batch. A failure in the read phase leaves storage untouched.

use crate::error::{RatingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::glicko2::{clamp_score, Match, PendingRating};
use crate::rating::storage::{RatingEntry, RatingStorage};
use crate::types::{GameResult, PlayerId, RatingChange};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Results collected for one rating period
#[derive(Debug, Clone)]
pub struct RatingPeriod {
    results: Vec<GameResult>,
    decay_inactive: bool,
}

impl Default for RatingPeriod {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingPeriod {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            decay_inactive: true,
        }
    }

    /// Whether registered players without games in this period decay
    pub fn with_decay_inactive(mut self, decay_inactive: bool) -> Self {
        self.decay_inactive = decay_inactive;
        self
    }

    /// Add a result; the opponent is credited with the mirrored score
    pub fn add_result(&mut self, result: GameResult) -> Result<()> {
        if result.player_id.is_empty() || result.opponent_id.is_empty() {
            return Err(RatingError::invalid("player ids must not be empty"));
        }
        if result.player_id == result.opponent_id {
            return Err(RatingError::invalid(format!(
                "player {} cannot play against itself",
                result.player_id
            )));
        }

        self.results.push(result);
        Ok(())
    }

    pub fn record(
        &mut self,
        player_id: impl Into<PlayerId>,
        opponent_id: impl Into<PlayerId>,
        score: f64,
    ) -> Result<()> {
        self.add_result(GameResult::new(player_id, opponent_id, score))
    }

    pub fn results(&self) -> &[GameResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Games per player as (opponent, clamped score) pairs, both sides of every result
    fn games_by_player(&self) -> BTreeMap<&str, Vec<(&str, f64)>> {
        let mut games: BTreeMap<&str, Vec<(&str, f64)>> = BTreeMap::new();
        for result in &self.results {
            let score = clamp_score(result.score);
            games
                .entry(result.player_id.as_str())
                .or_default()
                .push((result.opponent_id.as_str(), score));
            games
                .entry(result.opponent_id.as_str())
                .or_default()
                .push((result.player_id.as_str(), 1.0 - score));
        }
        games
    }

    /// Run the period against `storage` and return one change per updated player, sorted by id
    pub fn process<C>(
        &self,
        storage: &dyn RatingStorage,
        calculator: &C,
    ) -> Result<Vec<RatingChange>>
    where
        C: RatingCalculator + ?Sized,
    {
        let games = self.games_by_player();

        let mut snapshot = storage.get_all_ratings()?;
        for player_id in games.keys() {
            if !snapshot.contains_key(*player_id) {
                debug!(player_id, "registering new player");
                snapshot.insert(
                    player_id.to_string(),
                    RatingEntry::new(player_id.to_string(), calculator.initial_rating()?),
                );
            }
        }

        info!(
            results = self.results.len(),
            participants = games.len(),
            registered = snapshot.len(),
            "processing rating period"
        );

        // Read phase: every pending value is computed from committed ratings only
        let pending = self.read_phase(&snapshot, &games, calculator)?;

        // Commit phase
        let mut changes = Vec::with_capacity(pending.len());
        let mut updated = Vec::with_capacity(pending.len());
        for (player_id, pending_rating) in pending {
            let mut entry = snapshot
                .get(&player_id)
                .cloned()
                .ok_or_else(|| RatingError::PlayerNotFound {
                    player_id: player_id.clone(),
                })?;

            let old_rating = calculator.display(&entry.rating);
            let mut rating = entry.rating;
            rating.apply(pending_rating);
            entry.update_rating(rating);

            let played = games.get(player_id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            for (_, score) in played {
                entry.record_result(*score);
            }

            let new_rating = calculator.display(&entry.rating);
            changes.push(RatingChange {
                player_id: player_id.clone(),
                old_rating,
                new_rating,
                delta: new_rating.rating - old_rating.rating,
                games: played.len(),
            });
            updated.push(entry);
        }

        storage.store_ratings(updated)?;
        info!(updated = changes.len(), "rating period committed");

        Ok(changes)
    }

    fn read_phase<C>(
        &self,
        snapshot: &HashMap<PlayerId, RatingEntry>,
        games: &BTreeMap<&str, Vec<(&str, f64)>>,
        calculator: &C,
    ) -> Result<BTreeMap<PlayerId, PendingRating>>
    where
        C: RatingCalculator + ?Sized,
    {
        let mut pending = BTreeMap::new();

        for (player_id, entry) in snapshot {
            match games.get(player_id.as_str()) {
                Some(played) => {
                    let matches = played
                        .iter()
                        .map(|(opponent_id, score)| {
                            snapshot
                                .get(*opponent_id)
                                .map(|opponent| Match::new(&opponent.rating, *score))
                                .ok_or_else(|| RatingError::PlayerNotFound {
                                    player_id: opponent_id.to_string(),
                                })
                        })
                        .collect::<Result<Vec<_>>>()?;

                    let update = calculator.calculate_update(&entry.rating, &matches)?;
                    pending.insert(player_id.clone(), update);
                }
                None if self.decay_inactive => {
                    pending.insert(player_id.clone(), calculator.calculate_decay(&entry.rating));
                }
                None => {}
            }
        }

        Ok(pending)
    }
}
