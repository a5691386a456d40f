//! Error types for indicator extraction

use thiserror::Error;

/// Error type for indicator extraction
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("LLM extraction failed: {0}")]
    ExtractionFailed(String),
}
