//! Analysis orchestration
//!
//! Runs the six pipeline stages strictly in order, exactly once per run:
//! indicator extraction, context retrieval, natural-language translation,
//! data-source identification, technique recommendation, relevance scoring.
//! One shared pacer spaces every external call in the run.

use std::sync::Arc;

use chrono::Utc;

use crate::model::{
    AnalysisReport, AnalysisStats, LlmProvider, PipelineConfig, SearchConfig,
};
use crate::service::cache::AnalysisCache;
use crate::service::cache_keys::generate_analysis_cache_key;
use crate::service::context::ContextRetrievalService;
use crate::service::datasource::identify_data_source;
use crate::service::extraction::{ExtractionError, IocExtractionService};
use crate::service::llm::LlmClient;
use crate::service::pacing::RatePacer;
use crate::service::recommendation::{RecommendationError, RecommendationService};
use crate::service::relevance::RelevanceService;
use crate::service::search::SearchProvider;
use crate::service::translation::{TranslationError, TranslationService};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Rule text is empty")]
    EmptyRule,

    #[error("No API key configured and none supplied with the request")]
    MissingApiKey,

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Indicator extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Rule translation failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("Technique recommendation failed: {0}")]
    Recommendation(#[from] RecommendationError),
}

/// One analysis request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub rule: String,
    /// Overrides the server-configured key when present
    pub api_key: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub max_techniques: Option<usize>,
}

/// Orchestrates the full rule-to-techniques pipeline
pub struct AnalysisService {
    provider: LlmProvider,
    model: String,
    default_client: Option<LlmClient>,
    pipeline: PipelineConfig,
    pacer: Arc<RatePacer>,
    cache: Option<AnalysisCache>,
    extraction: IocExtractionService,
    context: ContextRetrievalService,
    translation: TranslationService,
    recommendation: RecommendationService,
    relevance: RelevanceService,
}

impl AnalysisService {
    pub fn new(
        provider: LlmProvider,
        model: String,
        default_client: Option<LlmClient>,
        pipeline: PipelineConfig,
        search_config: SearchConfig,
        search: Arc<dyn SearchProvider>,
        cache: Option<AnalysisCache>,
    ) -> Self {
        let pacer = Arc::new(RatePacer::from_millis(pipeline.call_delay_ms));

        let context = ContextRetrievalService::new(
            search,
            search_config,
            Arc::clone(&pacer),
            cache.clone(),
            pipeline.max_iocs_per_category,
        );

        let recommendation = RecommendationService::new(pipeline.candidate_count);
        let relevance = RelevanceService::new(Arc::clone(&pacer));

        Self {
            provider,
            model,
            default_client,
            pipeline,
            pacer,
            cache,
            extraction: IocExtractionService::new(),
            context,
            translation: TranslationService::new(),
            recommendation,
            relevance,
        }
    }

    /// Run the full pipeline for one rule
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let rule = request.rule.trim();
        if rule.is_empty() {
            return Err(AnalysisError::EmptyRule);
        }

        // Resolve and validate the key before anything can touch the network
        let llm = self.resolve_client(request.api_key.as_deref())?;

        let confidence_threshold = request
            .confidence_threshold
            .unwrap_or(self.pipeline.confidence_threshold)
            .clamp(0.0, 1.0);
        let max_techniques = request.max_techniques.unwrap_or(self.pipeline.max_techniques);

        let cache_key =
            generate_analysis_cache_key(rule, self.provider, &self.model, confidence_threshold);

        if let Some(cache) = &self.cache {
            if let Ok(report) = cache.get_analysis::<AnalysisReport>(&cache_key).await {
                tracing::info!(rule_length = rule.len(), "Analysis cache hit");
                return Ok(truncate_report(report, max_techniques));
            }
        }

        let start_time = std::time::Instant::now();

        tracing::info!(step = "1/6", "Extracting indicators of compromise");
        self.pacer.wait().await;
        let iocs = self.extraction.extract(&llm, rule).await?;

        tracing::info!(step = "2/6", "Retrieving contextual information");
        let context = self.context.retrieve(&iocs).await;

        tracing::info!(step = "3/6", "Translating rule to natural language");
        self.pacer.wait().await;
        let rule_description = self.translation.describe(&llm, rule, &iocs, &context).await?;

        tracing::info!(step = "4/6", "Identifying data source");
        let data_source = identify_data_source(&rule_description);

        tracing::info!(step = "5/6", "Recommending probable techniques");
        self.pacer.wait().await;
        let candidates = self.recommendation.recommend(&llm, &rule_description).await?;

        tracing::info!(step = "6/6", "Scoring technique relevance");
        let mappings = self
            .relevance
            .score(&llm, &rule_description, &candidates, confidence_threshold)
            .await;

        let stats = AnalysisStats::from_mappings(&mappings);

        let report = AnalysisReport {
            rule_description,
            data_source: data_source.to_string(),
            iocs,
            context,
            techniques: mappings,
            stats,
            model: llm.model().to_string(),
            generated_at: Utc::now(),
        };

        tracing::info!(
            elapsed_ms = start_time.elapsed().as_millis(),
            techniques_found = report.stats.techniques_found,
            "Analysis completed"
        );

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_analysis(&cache_key, &report).await {
                tracing::debug!(error = %e, "Failed to cache analysis report");
            }
        }

        Ok(truncate_report(report, max_techniques))
    }

    /// Whether a server-side API key was configured at startup
    pub fn has_default_key(&self) -> bool {
        self.default_client.is_some()
    }

    fn resolve_client(&self, request_key: Option<&str>) -> Result<LlmClient, AnalysisError> {
        match request_key {
            Some(key) => LlmClient::new(self.provider, &self.model, key)
                .map_err(|e| AnalysisError::InvalidApiKey(e.to_string())),
            None => self
                .default_client
                .clone()
                .ok_or(AnalysisError::MissingApiKey),
        }
    }
}

/// Cap the technique list at the display maximum; stats keep the full count
fn truncate_report(mut report: AnalysisReport, max_techniques: usize) -> AnalysisReport {
    report.techniques.truncate(max_techniques);
    report
}
