//! Error types for the rating engine
//!
//! Every failure the core can produce is local to a single competitor's
//! update, so callers receive a typed error they can match on and decide
//! whether to log, retry, or skip.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RatingError>;

/// Errors raised by the rating engine and the competitor registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Degenerate variance: match information sum is {information}")]
    DegenerateVariance { information: f64 },

    #[error("Volatility bracket search exhausted after {steps} steps")]
    BracketSearchExhausted { steps: usize },

    #[error("Volatility solver did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("Competitor not found: {competitor_id}")]
    CompetitorNotFound { competitor_id: String },

    #[error("Invalid rating record: {reason}")]
    InvalidRating { reason: String },

    #[error("Invalid match score: {score} (expected a value in [0, 1])")]
    InvalidScore { score: f64 },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RatingError {
    /// Short stable label for the error kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            RatingError::DegenerateVariance { .. } => "degenerate_variance",
            RatingError::BracketSearchExhausted { .. } => "bracket_search_exhausted",
            RatingError::NonConvergence { .. } => "non_convergence",
            RatingError::CompetitorNotFound { .. } => "competitor_not_found",
            RatingError::InvalidRating { .. } => "invalid_rating",
            RatingError::InvalidScore { .. } => "invalid_score",
            RatingError::ConfigurationError { .. } => "configuration",
            RatingError::Internal { .. } => "internal",
        }
    }
}
