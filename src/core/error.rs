use thiserror::Error;

/// Errors raised by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Malformed profile {id}: {reason}")]
    MalformedProfile { id: String, reason: String },

    #[error("Learned scoring requested but no learned scorer is configured")]
    ScorerUnavailable,

    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("Learned scorer returned a non-finite score: {0}")]
    InvalidPrediction(f64),
}

impl MatchError {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::MalformedProfile {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
