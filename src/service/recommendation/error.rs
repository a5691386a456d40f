//! Error types for technique recommendation

use thiserror::Error;

/// Error type for technique recommendation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error("LLM recommendation failed: {0}")]
    RecommendationFailed(String),
}
