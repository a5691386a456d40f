//! Application state and service initialization
//!
//! This module centralizes service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use crate::model::Config;
use crate::service::search::SearchProvider;
use crate::service::{AnalysisCache, AnalysisService, DuckDuckGoClient, LlmClient};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Redis cache (optional)
    pub cache: Option<AnalysisCache>,
    /// Rule analysis pipeline service
    pub analysis_service: Arc<AnalysisService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Redis cache initialization (optional)
    /// 2. LLM client initialization when a server-side key is configured
    /// 3. Service dependency graph construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        // Initialize Redis cache (optional - will log warning if Redis is unavailable)
        let cache = match AnalysisCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        // A server-side key is optional; requests may carry their own.
        // A configured key that fails validation is a startup error.
        let default_client = match &config.api_key {
            Some(key) => Some(
                LlmClient::new(config.provider, &config.model, key)
                    .map_err(|_| AppError::InvalidConfig(config.provider.api_key_env()))?,
            ),
            None => {
                tracing::info!(
                    env = config.provider.api_key_env(),
                    "No server-side API key configured; requests must supply their own"
                );
                None
            }
        };

        tracing::info!(
            provider = %config.provider,
            model = %config.model,
            "LLM pipeline configured"
        );

        let search: Arc<dyn SearchProvider> = Arc::new(DuckDuckGoClient::new());

        let analysis_service = Arc::new(AnalysisService::new(
            config.provider,
            config.model,
            default_client,
            config.pipeline,
            config.search,
            search,
            cache.clone(),
        ));

        Ok(Self {
            cache,
            analysis_service,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
