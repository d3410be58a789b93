//! Glicko-2 rating model
//!
//! A [`Rating`] stores its state on the internal (Glicko-2) scale. Updating is
//! split into two phases: [`Rating::update`] and [`Rating::decay`] are pure and
//! return a [`PendingRating`]; [`Rating::apply`] consumes that value and makes
//! it current. Because a pending value is moved into `apply`, it can never be
//! committed twice.

use crate::config::GlickoConfig;
use crate::error::{RatingError, Result};
use crate::rating::volatility::VolatilitySolver;
use crate::types::PlayerRating;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

/// Player rating on the internal Glicko-2 scale
///
/// Deserialization goes through the same checks as [`Rating::from_internal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RatingFields")]
pub struct Rating {
    mu: f64,
    phi: f64,
    sigma: f64,
    delta: f64,
}

#[derive(Deserialize)]
struct RatingFields {
    mu: f64,
    phi: f64,
    sigma: f64,
    #[serde(default)]
    delta: f64,
}

impl TryFrom<RatingFields> for Rating {
    type Error = RatingError;

    fn try_from(fields: RatingFields) -> Result<Self> {
        if !fields.delta.is_finite() {
            return Err(RatingError::invalid(format!(
                "delta must be finite, got {}",
                fields.delta
            )));
        }

        let rating = Self::from_internal(fields.mu, fields.phi, fields.sigma)?;
        Ok(Self {
            delta: fields.delta,
            ..rating
        })
    }
}

/// New values computed by an update or a decay, not yet committed
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "a pending rating does nothing until it is applied"]
pub struct PendingRating {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64,
}

/// A game against a rated opponent
///
/// Borrows the opponent, so the update sees the opponent's current values.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    opponent: &'a Rating,
    score: f64,
}

/// Clamp a raw score to a loss (0), draw (0.5) or win (1)
pub fn clamp_score(raw: f64) -> f64 {
    if raw <= 0.0 {
        0.0
    } else if raw >= 1.0 {
        1.0
    } else {
        0.5
    }
}

/// Opponent impact weight, shrinking as the opponent's deviation grows
pub fn g(phi: f64) -> f64 {
    let scale = phi / PI;
    1.0 / (1.0 + 3.0 * scale * scale).sqrt()
}

/// Expected score of a player rated `mu` against an opponent rated `mu_opponent`,
/// where `g` is the opponent's impact weight
pub fn expected_score(g: f64, mu: f64, mu_opponent: f64) -> f64 {
    1.0 / (1.0 + (-g * (mu - mu_opponent)).exp())
}

impl<'a> Match<'a> {
    pub fn new(opponent: &'a Rating, score: f64) -> Self {
        Self {
            opponent,
            score: clamp_score(score),
        }
    }

    pub fn opponent(&self) -> &'a Rating {
        self.opponent
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

impl Default for Rating {
    fn default() -> Self {
        let config = GlickoConfig::default();
        Self {
            mu: 0.0,
            phi: config.default_deviation / config.scale,
            sigma: config.default_volatility,
            delta: 0.0,
        }
    }
}

impl Rating {
    /// Create a rating with the configured defaults
    pub fn new(config: &GlickoConfig) -> Result<Self> {
        Self::from_display(
            config.default_rating,
            config.default_deviation,
            config.default_volatility,
            config,
        )
    }

    /// Create a rating from display-scale values
    pub fn from_display(
        rating: f64,
        deviation: f64,
        volatility: f64,
        config: &GlickoConfig,
    ) -> Result<Self> {
        Self::from_internal(
            (rating - config.default_rating) / config.scale,
            deviation / config.scale,
            volatility,
        )
    }

    /// Create a rating from a display-scale snapshot
    pub fn from_player_rating(rating: &PlayerRating, config: &GlickoConfig) -> Result<Self> {
        Self::from_display(rating.rating, rating.deviation, rating.volatility, config)
    }

    /// Create a rating from internal-scale values
    pub fn from_internal(mu: f64, phi: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() {
            return Err(RatingError::invalid(format!("rating must be finite, got {mu}")));
        }
        if !(phi.is_finite() && phi > 0.0) {
            return Err(RatingError::invalid(format!(
                "deviation must be positive, got {phi}"
            )));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(RatingError::invalid(format!(
                "volatility must be positive, got {sigma}"
            )));
        }

        Ok(Self {
            mu,
            phi,
            sigma,
            delta: 0.0,
        })
    }

    /// Set the change recorded by the previous commit, given on the display scale
    pub fn with_display_delta(mut self, delta: f64, config: &GlickoConfig) -> Self {
        self.delta = delta / config.scale;
        self
    }

    /// Display-scale rating
    pub fn rating(&self, config: &GlickoConfig) -> f64 {
        self.mu * config.scale + config.default_rating
    }

    /// Display-scale deviation
    pub fn deviation(&self, config: &GlickoConfig) -> f64 {
        self.phi * config.scale
    }

    /// Display-scale change from the most recent commit
    pub fn display_delta(&self, config: &GlickoConfig) -> f64 {
        self.delta * config.scale
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Internal-scale change from the most recent commit
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn to_display(&self, config: &GlickoConfig) -> PlayerRating {
        PlayerRating {
            rating: self.rating(config),
            deviation: self.deviation(config),
            volatility: self.sigma,
        }
    }

    /// Internal-scale triple formatted as `[µ..:φ..:σ..]`
    pub fn summary(&self) -> String {
        format!("[µ{}:φ{}:σ{}]", self.mu, self.phi, self.sigma)
    }

    /// Compute new values from the outcomes of one or more matches
    pub fn update(&self, matches: &[Match<'_>], config: &GlickoConfig) -> Result<PendingRating> {
        if matches.is_empty() {
            return Err(RatingError::invalid(
                "update needs at least one match, use decay for an idle period",
            ));
        }

        let mut inv_v = 0.0;
        let mut d_inner = 0.0;
        for m in matches {
            let opponent = m.opponent();
            let weight = g(opponent.phi);
            let e = expected_score(weight, self.mu, opponent.mu);

            inv_v += weight * weight * e * (1.0 - e);
            d_inner += weight * (m.score() - e);
        }

        if !(inv_v.is_finite() && inv_v > 0.0) {
            warn!(inv_v, matches = matches.len(), "degenerate match set");
            return Err(RatingError::invalid(format!(
                "match set carries no information (1/v = {inv_v})"
            )));
        }

        let v = 1.0 / inv_v;
        let d = v * d_inner;

        let solver = VolatilitySolver::from_config(config);
        let sigma = solver.new_volatility(d, v, self.phi, self.sigma)?;
        let phi = 1.0 / (1.0 / (self.phi * self.phi + sigma * sigma) + inv_v).sqrt();
        let mu = self.mu + phi * phi * d_inner;

        let pending = PendingRating { mu, phi, sigma };
        if !pending.is_finite() {
            warn!(?pending, "update produced non-finite values");
            return Err(RatingError::invalid("update produced non-finite values"));
        }
        if !(pending.phi > 0.0 && pending.sigma > 0.0) {
            warn!(?pending, "update produced a non-positive deviation or volatility");
            return Err(RatingError::invalid(
                "update produced a non-positive deviation or volatility",
            ));
        }

        Ok(pending)
    }

    /// Single-match form of [`Rating::update`]
    pub fn update_single(&self, m: &Match<'_>, config: &GlickoConfig) -> Result<PendingRating> {
        self.update(std::slice::from_ref(m), config)
    }

    /// Compute new values for a period without games: only the deviation grows
    pub fn decay(&self) -> PendingRating {
        PendingRating {
            mu: self.mu,
            phi: (self.phi * self.phi + self.sigma * self.sigma).sqrt(),
            sigma: self.sigma,
        }
    }

    /// Commit pending values, recording the change in rating
    pub fn apply(&mut self, pending: PendingRating) {
        self.delta = pending.mu - self.mu;
        self.mu = pending.mu;
        self.phi = pending.phi;
        self.sigma = pending.sigma;
    }
}

impl PendingRating {
    fn is_finite(&self) -> bool {
        self.mu.is_finite() && self.phi.is_finite() && self.sigma.is_finite()
    }
}
