//! Indicator extraction service using LLM
//!
//! Stage 1 of the pipeline: pulls IoCs out of the raw rule text and
//! grounds them against it.

use crate::model::extracted::ExtractedIndicators;
use crate::model::Ioc;
use crate::service::extraction::prompts::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use crate::service::extraction::validation::ground_indicators;
use crate::service::llm::{GenerationParams, LlmClient};

pub mod error;
pub mod prompts;
pub mod validation;

pub use error::ExtractionError;

/// Service for extracting indicators from SIEM rules
pub struct IocExtractionService {
    params: GenerationParams,
}

impl IocExtractionService {
    pub fn new() -> Self {
        Self {
            // Low temperature keeps extraction close to the literal rule text
            params: GenerationParams {
                temperature: 0.1,
                max_tokens: 2048,
            },
        }
    }

    /// Extract grounded indicators from a rule
    pub async fn extract(&self, llm: &LlmClient, rule: &str) -> Result<Vec<Ioc>, ExtractionError> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            model = %llm.model(),
            rule_length = rule.len(),
            "Initiating LLM call for indicator extraction"
        );

        let prompt = build_extraction_prompt(rule);

        let extracted: ExtractedIndicators = llm
            .extract(EXTRACTION_SYSTEM_PROMPT, &prompt, self.params)
            .await
            .map_err(|e| {
                tracing::error!(
                    model = %llm.model(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "LLM call for indicator extraction failed"
                );
                ExtractionError::ExtractionFailed(e.to_string())
            })?;

        let result = ground_indicators(&extracted, rule);

        if !result.dropped.is_empty() {
            tracing::warn!(
                dropped = ?result.dropped,
                "Dropped indicators not present in the rule text"
            );
        }

        tracing::info!(
            model = %llm.model(),
            elapsed_ms = start_time.elapsed().as_millis(),
            indicator_count = result.grounded.len(),
            "Indicator extraction completed"
        );

        Ok(result.grounded)
    }
}

impl Default for IocExtractionService {
    fn default() -> Self {
        Self::new()
    }
}
