//! Technique recommendation service using LLM
//!
//! Stage 5 of the pipeline: proposes candidate ATT&CK techniques from the
//! rule description. Candidates are validated before scoring.

use crate::model::extracted::ExtractedCandidates;
use crate::model::TechniqueCandidate;
use crate::service::llm::{GenerationParams, LlmClient};
use crate::service::recommendation::prompts::{
    build_recommendation_prompt, RECOMMENDATION_SYSTEM_PROMPT,
};
use crate::service::recommendation::validation::validate_candidates;

pub mod error;
pub mod prompts;
pub mod validation;

pub use error::RecommendationError;

/// Service for recommending probable ATT&CK techniques
pub struct RecommendationService {
    candidate_count: usize,
    params: GenerationParams,
}

impl RecommendationService {
    pub fn new(candidate_count: usize) -> Self {
        Self {
            candidate_count,
            params: GenerationParams {
                temperature: 0.1,
                max_tokens: 3072,
            },
        }
    }

    /// Recommend candidate techniques for a rule description
    pub async fn recommend(
        &self,
        llm: &LlmClient,
        rule_description: &str,
    ) -> Result<Vec<TechniqueCandidate>, RecommendationError> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            model = %llm.model(),
            candidate_count = self.candidate_count,
            "Initiating LLM call for technique recommendation"
        );

        let prompt = build_recommendation_prompt(rule_description, self.candidate_count);

        let extracted: ExtractedCandidates = llm
            .extract(RECOMMENDATION_SYSTEM_PROMPT, &prompt, self.params)
            .await
            .map_err(|e| {
                tracing::error!(
                    model = %llm.model(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "LLM call for technique recommendation failed"
                );
                RecommendationError::RecommendationFailed(e.to_string())
            })?;

        let result = validate_candidates(&extracted);

        if !result.rejected.is_empty() {
            tracing::warn!(
                rejected = ?result.rejected,
                "Rejected malformed or duplicate technique candidates"
            );
        }

        tracing::info!(
            model = %llm.model(),
            elapsed_ms = start_time.elapsed().as_millis(),
            candidate_count = result.valid.len(),
            "Technique recommendation completed"
        );

        Ok(result.valid)
    }
}
