// src/error.rs
//! Typed failures for the scoring pipeline. Transport/IO problems stay in
//! `anyhow` at the binary boundary; these are the domain kinds callers match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// Input too short (or otherwise unusable) for document scoring.
    #[error("text too short to score: {len} chars (minimum {min})")]
    Validation { len: usize, min: usize },

    /// The sentence classifier artifact is missing or unusable and the caller
    /// required it. On-demand scoring degrades instead of returning this.
    #[error("sentence model unavailable: {0}")]
    ModelUnavailable(String),

    /// A stored record cannot be scored as-is (e.g. empty body).
    #[error("stored article {id} unusable: {reason}")]
    InconsistentState { id: String, reason: String },

    /// The model artifact exists but failed to load or validate.
    #[error("model artifact error: {0}")]
    Artifact(String),
}

impl ScoreError {
    pub fn inconsistent(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentState {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
