//! Rule translation service using LLM
//!
//! Stage 3 of the pipeline: turns the rule plus extracted context into a
//! natural-language description that the mapping stages reason over.

use crate::model::{ContextSnippet, Ioc};
use crate::service::llm::{GenerationParams, LlmClient};
use crate::service::translation::prompts::{build_translation_prompt, TRANSLATION_SYSTEM_PROMPT};

pub mod error;
pub mod prompts;

pub use error::TranslationError;

/// Service for translating SIEM rules into natural language
pub struct TranslationService {
    params: GenerationParams,
}

impl TranslationService {
    pub fn new() -> Self {
        Self {
            // Slightly warmer than extraction; the output is prose
            params: GenerationParams {
                temperature: 0.2,
                max_tokens: 4096,
            },
        }
    }

    /// Describe what the rule detects
    pub async fn describe(
        &self,
        llm: &LlmClient,
        rule: &str,
        iocs: &[Ioc],
        context: &[ContextSnippet],
    ) -> Result<String, TranslationError> {
        let start_time = std::time::Instant::now();

        let prompt = build_translation_prompt(rule, iocs, context);

        let description = llm
            .complete(TRANSLATION_SYSTEM_PROMPT, &prompt, self.params)
            .await
            .map_err(|e| {
                tracing::error!(
                    model = %llm.model(),
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "LLM call for rule translation failed"
                );
                TranslationError::TranslationFailed(e.to_string())
            })?;

        let description = description.trim().to_string();

        tracing::info!(
            model = %llm.model(),
            elapsed_ms = start_time.elapsed().as_millis(),
            description_length = description.len(),
            "Rule translation completed"
        );

        Ok(description)
    }
}

impl Default for TranslationService {
    fn default() -> Self {
        Self::new()
    }
}
