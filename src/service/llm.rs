//! Shared LLM client and interaction utilities
//!
//! Provides a common interface over the supported hosted providers
//! (Gemini and Claude). Structured stages describe their expected output
//! with a JSON Schema; the client carves JSON out of the completion text
//! and retries with a fixed delay when the provider errors or the output
//! does not conform.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::{anthropic, gemini};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

use crate::model::LlmProvider;

/// Maximum attempts per call (provider errors and malformed output alike)
const MAX_ATTEMPTS: usize = 3;

/// Fixed delay between attempts; rate limits are mitigated by this delay,
/// not by exponential backoff
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Shortest key any supported provider issues
const MIN_API_KEY_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    #[error("Invalid API key: {0}")]
    InvalidApiKey(&'static str),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("LLM output did not match the expected schema: {0}")]
    MalformedOutput(String),
}

/// Generation parameters for a single call
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 2048,
        }
    }
}

/// Provider seam. Production backends wrap rig clients; tests substitute
/// scripted implementations.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        preamble: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError>;
}

/// Reject keys that cannot possibly be valid before any network call is made
pub fn validate_api_key(api_key: &str) -> Result<(), LlmError> {
    if api_key.is_empty() {
        return Err(LlmError::InvalidApiKey("key is empty"));
    }
    if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(LlmError::InvalidApiKey(
            "key contains whitespace or control characters",
        ));
    }
    if api_key.len() < MIN_API_KEY_LEN {
        return Err(LlmError::InvalidApiKey("key is too short"));
    }
    Ok(())
}

struct GeminiBackend {
    client: gemini::Client,
}

impl GeminiBackend {
    fn new(api_key: &str) -> Result<Self, LlmError> {
        let client = gemini::Client::new(api_key);
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(
        &self,
        model: &str,
        preamble: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(model)
            .preamble(preamble)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))
    }
}

struct AnthropicBackend {
    client: anthropic::Client,
}

impl AnthropicBackend {
    fn new(api_key: &str) -> Result<Self, LlmError> {
        let client = anthropic::Client::new(api_key);
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(
        &self,
        model: &str,
        preamble: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(model)
            .preamble(preamble)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))
    }
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client for the given provider
    ///
    /// The key is validated locally first; an invalid key never reaches
    /// the network.
    pub fn new(provider: LlmProvider, model: &str, api_key: &str) -> Result<Self, LlmError> {
        validate_api_key(api_key)?;

        let backend: Arc<dyn CompletionBackend> = match provider {
            LlmProvider::Gemini => Arc::new(GeminiBackend::new(api_key)?),
            LlmProvider::Anthropic => Arc::new(AnthropicBackend::new(api_key)?),
        };

        Ok(Self {
            backend,
            model: model.to_string(),
        })
    }

    /// Wrap an existing backend
    pub fn from_backend(backend: Arc<dyn CompletionBackend>, model: &str) -> Self {
        Self {
            backend,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Free-text completion with fixed-delay retries on provider errors
    pub async fn complete(
        &self,
        preamble: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, LlmError> {
        let mut last_error = LlmError::Provider("no attempts made".to_string());

        for attempt in 1..=MAX_ATTEMPTS {
            match self
                .backend
                .complete(&self.model, preamble, prompt, params)
                .await
            {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!(attempt = attempt, error = %e, "LLM completion failed");
                    last_error = e;
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    /// Schema-guided structured completion
    ///
    /// The JSON Schema of `T` is appended to the prompt. Non-conforming
    /// output triggers regeneration, up to the attempt limit.
    pub async fn extract<T>(
        &self,
        preamble: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<T, LlmError>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let schema = serde_json::to_string_pretty(&schema_for!(T))
            .map_err(|e| LlmError::MalformedOutput(e.to_string()))?;

        let full_prompt = format!(
            "{}\n\nReturn ONLY valid JSON conforming to this JSON Schema, with no surrounding prose:\n{}",
            prompt, schema
        );

        let mut last_error = LlmError::Provider("no attempts made".to_string());

        for attempt in 1..=MAX_ATTEMPTS {
            match self
                .backend
                .complete(&self.model, preamble, &full_prompt, params)
                .await
            {
                Ok(text) => match parse_structured::<T>(&text) {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        tracing::warn!(
                            attempt = attempt,
                            error = %e,
                            "LLM output failed schema validation, regenerating"
                        );
                        last_error = LlmError::MalformedOutput(e);
                    }
                },
                Err(e) => {
                    tracing::debug!(attempt = attempt, error = %e, "LLM extraction call failed");
                    last_error = e;
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        Err(last_error)
    }
}

/// Carve the first JSON object or array out of free-form model output
///
/// Models wrap JSON in prose or markdown fences often enough that strict
/// parsing of the whole completion is a losing game.
fn carve_json(text: &str) -> Option<String> {
    let object_re = Regex::new(r"(?s)\{.*\}").unwrap();
    let array_re = Regex::new(r"(?s)\[.*\]").unwrap();

    let object = object_re.find(text);
    let array = array_re.find(text);

    match (object, array) {
        (Some(o), Some(a)) => {
            // Take whichever starts first; an array wrapped in an object
            // belongs to the object
            if o.start() <= a.start() {
                Some(o.as_str().to_string())
            } else {
                Some(a.as_str().to_string())
            }
        }
        (Some(o), None) => Some(o.as_str().to_string()),
        (None, Some(a)) => Some(a.as_str().to_string()),
        (None, None) => None,
    }
}

fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let json = carve_json(text).ok_or_else(|| "no JSON found in output".to_string())?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}
