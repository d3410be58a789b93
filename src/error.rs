//! Error types for the rating engine
//!
//! Library operations return the typed [`RatingError`] so callers can tell a
//! degenerate match set apart from a solver that failed to converge.
//! Application-level code (configuration loading, the CLI) wraps these in anyhow.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RatingError>;

/// Custom error types for specific rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Volatility solver did not converge after {iterations} iterations")]
    Unconverged { iterations: u32 },

    #[error("Out of sequence: {reason}")]
    SequenceError { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl RatingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RatingError::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RatingError::Unconverged { iterations: 42 };
        assert_eq!(
            err.to_string(),
            "Volatility solver did not converge after 42 iterations"
        );

        let err = RatingError::invalid("deviation must be positive");
        assert_eq!(err.to_string(), "Invalid input: deviation must be positive");
    }
}
