//! Utilities for generating cache keys for analysis reports and context lookups

use sha2::{Digest, Sha256};

use crate::model::LlmProvider;
use crate::service::extraction::prompts::EXTRACTION_SYSTEM_PROMPT;
use crate::service::recommendation::prompts::RECOMMENDATION_SYSTEM_PROMPT;
use crate::service::relevance::prompts::RELEVANCE_SYSTEM_PROMPT;
use crate::service::translation::prompts::TRANSLATION_SYSTEM_PROMPT;

/// Generate cache key hash for a full analysis report
///
/// The key is based on:
/// - the rule text
/// - provider and model id
/// - confidence threshold
/// - prompt_version (hash of all stage system prompts)
pub fn generate_analysis_cache_key(
    rule: &str,
    provider: LlmProvider,
    model_id: &str,
    confidence_threshold: f64,
) -> String {
    // Any prompt change invalidates previously cached reports
    let prompt_content = format!(
        "{}\n{}\n{}\n{}",
        EXTRACTION_SYSTEM_PROMPT,
        TRANSLATION_SYSTEM_PROMPT,
        RECOMMENDATION_SYSTEM_PROMPT,
        RELEVANCE_SYSTEM_PROMPT
    );
    let prompt_version = hash_string(&prompt_content);

    let key_components = format!(
        "{}|{}|{}|{:.2}|{}",
        hash_string(rule),
        provider,
        model_id,
        confidence_threshold,
        prompt_version
    );

    hash_string(&key_components)
}

/// Generate cache key hash for a context lookup query
pub fn generate_context_cache_key(query: &str) -> String {
    hash_string(query)
}

/// Hash a string to a hex string using SHA256
fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}
