//! Error types for rule translation

use thiserror::Error;

/// Error type for rule translation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslationError {
    #[error("LLM translation failed: {0}")]
    TranslationFailed(String),
}
