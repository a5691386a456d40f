//! Relevance scoring service using LLM
//!
//! Stage 6 of the pipeline: scores each candidate technique against the
//! rule description, keeps those at or above the confidence threshold,
//! and orders the survivors by descending confidence. A failed verdict
//! skips that candidate rather than aborting the run.

use std::sync::Arc;

use crate::model::extracted::ExtractedRelevance;
use crate::model::{TechniqueCandidate, TechniqueMapping};
use crate::service::llm::{GenerationParams, LlmClient};
use crate::service::pacing::RatePacer;
use crate::service::relevance::prompts::{build_relevance_prompt, RELEVANCE_SYSTEM_PROMPT};
use crate::service::relevance::validation::normalize_verdict;

pub mod prompts;
pub mod validation;

/// Service for scoring candidate techniques against a rule description
pub struct RelevanceService {
    pacer: Arc<RatePacer>,
    params: GenerationParams,
}

impl RelevanceService {
    pub fn new(pacer: Arc<RatePacer>) -> Self {
        Self {
            pacer,
            params: GenerationParams {
                temperature: 0.1,
                max_tokens: 1024,
            },
        }
    }

    /// Score candidates and keep those at or above the threshold,
    /// sorted by descending confidence
    pub async fn score(
        &self,
        llm: &LlmClient,
        rule_description: &str,
        candidates: &[TechniqueCandidate],
        confidence_threshold: f64,
    ) -> Vec<TechniqueMapping> {
        let mut mappings = Vec::new();

        for candidate in candidates {
            self.pacer.wait().await;

            let prompt = build_relevance_prompt(rule_description, candidate);

            let verdict: ExtractedRelevance = match llm
                .extract(RELEVANCE_SYSTEM_PROMPT, &prompt, self.params)
                .await
            {
                Ok(verdict) => normalize_verdict(verdict),
                Err(e) => {
                    tracing::warn!(
                        technique = %candidate.id,
                        error = %e,
                        "Relevance scoring failed for candidate, skipping"
                    );
                    continue;
                }
            };

            tracing::debug!(
                technique = %candidate.id,
                confidence = verdict.confidence,
                "Scored candidate technique"
            );

            if verdict.confidence >= confidence_threshold {
                mappings.push(TechniqueMapping {
                    id: candidate.id.clone(),
                    name: candidate.name.clone(),
                    description: candidate.description.clone(),
                    confidence: verdict.confidence,
                    reasoning: verdict.reasoning,
                });
            }
        }

        // Sort by confidence score, highest first
        mappings.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            scored = candidates.len(),
            kept = mappings.len(),
            threshold = confidence_threshold,
            "Relevance scoring completed"
        );

        mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::tests::ScriptedBackend;

    fn candidate(id: &str) -> TechniqueCandidate {
        TechniqueCandidate {
            id: id.to_string(),
            name: format!("{} name", id),
            description: "desc".to_string(),
        }
    }

    fn verdict_json(confidence: f64) -> Result<String, String> {
        Ok(format!(
            r#"{{"confidence": {}, "reasoning": "because"}}"#,
            confidence
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_filters_and_sorts_descending() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            verdict_json(0.72),
            verdict_json(0.4),
            verdict_json(0.95),
        ]));
        let llm = LlmClient::from_backend(backend, "test-model");
        let service = RelevanceService::new(Arc::new(RatePacer::from_millis(0)));

        let mappings = service
            .score(
                &llm,
                "desc",
                &[candidate("T1055"), candidate("T1003"), candidate("T1059")],
                0.7,
            )
            .await;

        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].id, "T1059");
        assert_eq!(mappings[1].id, "T1055");
        assert!(mappings[0].confidence >= mappings[1].confidence);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_candidate_is_skipped() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            // First candidate: three malformed outputs exhaust the retries
            Ok("garbage".to_string()),
            Ok("garbage".to_string()),
            Ok("garbage".to_string()),
            verdict_json(0.8),
        ]));
        let llm = LlmClient::from_backend(backend, "test-model");
        let service = RelevanceService::new(Arc::new(RatePacer::from_millis(0)));

        let mappings = service
            .score(&llm, "desc", &[candidate("T1055"), candidate("T1003")], 0.7)
            .await;

        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].id, "T1003");
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_confidence_is_clamped() {
        let backend = Arc::new(ScriptedBackend::new(vec![verdict_json(1.4)]));
        let llm = LlmClient::from_backend(backend, "test-model");
        let service = RelevanceService::new(Arc::new(RatePacer::from_millis(0)));

        let mappings = service.score(&llm, "desc", &[candidate("T1055")], 0.7).await;

        assert_eq!(mappings.len(), 1);
        assert!((mappings[0].confidence - 1.0).abs() < 1e-9);
    }
}
