//! Staged rating
//!
//! Wraps a [`Rating`] with a pending slot so callers can drive the
//! update / decay / apply cycle one step at a time. `apply` consumes the
//! pending value; applying again without a fresh update or decay is rejected
//! with [`RatingError::SequenceError`].

use crate::config::GlickoConfig;
use crate::error::{RatingError, Result};
use crate::rating::glicko2::{Match, PendingRating, Rating};
use crate::types::PlayerRating;

#[derive(Debug, Clone, Default)]
pub struct StagedRating {
    current: Rating,
    pending: Option<PendingRating>,
}

impl StagedRating {
    pub fn new(current: Rating) -> Self {
        Self {
            current,
            pending: None,
        }
    }

    /// The committed rating, the only state opponents ever read
    pub fn current(&self) -> &Rating {
        &self.current
    }

    pub fn pending(&self) -> Option<&PendingRating> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stage new values computed from the given matches; replaces any earlier pending value
    pub fn update(&mut self, matches: &[Match<'_>], config: &GlickoConfig) -> Result<()> {
        let pending = self.current.update(matches, config)?;
        self.pending = Some(pending);
        Ok(())
    }

    pub fn update_single(&mut self, m: &Match<'_>, config: &GlickoConfig) -> Result<()> {
        self.update(std::slice::from_ref(m), config)
    }

    /// Stage the no-games decay
    pub fn decay(&mut self) {
        self.pending = Some(self.current.decay());
    }

    /// Commit the staged values
    pub fn apply(&mut self) -> Result<()> {
        let pending = self.pending.take().ok_or_else(|| RatingError::SequenceError {
            reason: "apply called without a pending update or decay".to_string(),
        })?;
        self.current.apply(pending);
        Ok(())
    }

    /// Drop staged values without committing them
    pub fn discard(&mut self) -> Option<PendingRating> {
        self.pending.take()
    }

    pub fn to_display(&self, config: &GlickoConfig) -> PlayerRating {
        self.current.to_display(config)
    }

    pub fn into_inner(self) -> Rating {
        self.current
    }
}

impl From<Rating> for StagedRating {
    fn from(rating: Rating) -> Self {
        Self::new(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_apply_without_update() {
        let mut staged = StagedRating::default();
        assert!(matches!(
            staged.apply(),
            Err(RatingError::SequenceError { .. })
        ));
        assert_eq!(*staged.current(), Rating::default());
    }

    #[test]
    fn test_second_apply_rejected() {
        let config = GlickoConfig::default();
        let opponent = Rating::default();
        let mut staged = StagedRating::default();

        staged.update_single(&Match::new(&opponent, 1.0), &config).unwrap();
        assert!(staged.has_pending());
        staged.apply().unwrap();
        let after_first = *staged.current();

        assert!(staged.apply().is_err());
        assert_eq!(*staged.current(), after_first);
    }

    #[test]
    fn test_update_leaves_current_untouched() {
        let config = GlickoConfig::default();
        let opponent = Rating::from_display(1700.0, 100.0, 0.06, &config).unwrap();
        let mut staged = StagedRating::default();

        staged.update_single(&Match::new(&opponent, 0.0), &config).unwrap();
        assert_eq!(*staged.current(), Rating::default());

        staged.apply().unwrap();
        assert!(staged.current().rating(&config) < 1500.0);
        assert!(staged.current().display_delta(&config) < 0.0);
    }

    #[test]
    fn test_two_player_cycle() {
        // Both players stage against each other's committed values before either applies
        let config = GlickoConfig::default();
        let mut x = StagedRating::default();
        let mut o = StagedRating::default();

        let x_view = *x.current();
        let o_view = *o.current();
        x.update_single(&Match::new(&o_view, 1.0), &config).unwrap();
        o.update_single(&Match::new(&x_view, 0.0), &config).unwrap();
        x.apply().unwrap();
        o.apply().unwrap();

        let x_rating = x.current().rating(&config);
        let o_rating = o.current().rating(&config);
        assert_abs_diff_eq!(x_rating - 1500.0, 1500.0 - o_rating, epsilon = 1e-9);
        assert!(x_rating > 1500.0);
    }

    #[test]
    fn test_decay_then_discard() {
        let mut staged = StagedRating::default();
        staged.decay();
        let pending = staged.discard().unwrap();
        assert!(pending.phi > staged.current().phi());
        assert!(!staged.has_pending());
    }

    #[test]
    fn test_failed_update_keeps_previous_pending() {
        let config = GlickoConfig::default();
        let mut staged = StagedRating::default();
        staged.decay();

        assert!(staged.update(&[], &config).is_err());
        assert!(staged.has_pending());
    }
}
