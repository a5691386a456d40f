//! Context retrieval service
//!
//! Stage 2 of the pipeline: enriches extracted indicators with web-derived
//! snippets. Lookups are paced, cached, and individually non-fatal; an
//! indicator without context still flows into the later stages.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{ContextSnippet, Ioc, IocCategory, SearchConfig};
use crate::service::cache::AnalysisCache;
use crate::service::cache_keys::generate_context_cache_key;
use crate::service::pacing::RatePacer;
use crate::service::search::SearchProvider;

/// Service for retrieving contextual information about indicators
pub struct ContextRetrievalService {
    search: Arc<dyn SearchProvider>,
    config: SearchConfig,
    pacer: Arc<RatePacer>,
    cache: Option<AnalysisCache>,
    max_iocs_per_category: usize,
}

impl ContextRetrievalService {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        config: SearchConfig,
        pacer: Arc<RatePacer>,
        cache: Option<AnalysisCache>,
        max_iocs_per_category: usize,
    ) -> Self {
        Self {
            search,
            config,
            pacer,
            cache,
            max_iocs_per_category,
        }
    }

    /// Retrieve context snippets for the given indicators
    ///
    /// At most `max_iocs_per_category` indicators per category are looked
    /// up, in extraction order. A failed lookup yields a placeholder
    /// snippet instead of aborting the run.
    pub async fn retrieve(&self, iocs: &[Ioc]) -> Vec<ContextSnippet> {
        let mut per_category: HashMap<IocCategory, usize> = HashMap::new();
        let mut snippets = Vec::new();

        for ioc in iocs {
            let seen = per_category.entry(ioc.category).or_insert(0);
            if *seen >= self.max_iocs_per_category {
                continue;
            }
            *seen += 1;

            snippets.push(self.retrieve_one(ioc).await);
        }

        tracing::info!(
            indicator_count = iocs.len(),
            snippet_count = snippets.len(),
            "Context retrieval completed"
        );

        snippets
    }

    async fn retrieve_one(&self, ioc: &Ioc) -> ContextSnippet {
        let query = format!("cybersecurity {} malware analysis threat", ioc.value);
        let cache_key = generate_context_cache_key(&query);

        if let Some(cache) = &self.cache {
            if let Ok(snippet) = cache.get_context::<ContextSnippet>(&cache_key).await {
                tracing::debug!(ioc = %ioc.value, "Context cache hit");
                return snippet;
            }
        }

        self.pacer.wait().await;

        let snippet = match self.search.lookup(&query).await {
            Ok(answer) => {
                tracing::debug!(
                    ioc = %ioc.value,
                    heading = answer.heading.as_deref().unwrap_or(""),
                    "Context lookup answered"
                );

                let source = answer
                    .source_url
                    .clone()
                    .filter(|url| self.config.is_url_allowed(url));

                match answer.snippet_text() {
                    Some(text) => ContextSnippet {
                        ioc: ioc.value.clone(),
                        text,
                        source,
                    },
                    None => ContextSnippet {
                        ioc: ioc.value.clone(),
                        text: format!("General cybersecurity context for: {}", ioc.value),
                        source: None,
                    },
                }
            }
            Err(e) => {
                tracing::warn!(ioc = %ioc.value, error = %e, "Context lookup failed, using fallback");
                ContextSnippet::fallback(&ioc.value)
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_context(&cache_key, &snippet).await {
                tracing::debug!(error = %e, "Failed to cache context snippet");
            }
        }

        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::search::{InstantAnswer, SearchError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use url::Url;

    struct StubSearch {
        answer: fn() -> Result<InstantAnswer, SearchError>,
        queries: Mutex<Vec<String>>,
    }

    impl StubSearch {
        fn new(answer: fn() -> Result<InstantAnswer, SearchError>) -> Self {
            Self {
                answer,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn lookup(&self, query: &str) -> Result<InstantAnswer, SearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            (self.answer)()
        }
    }

    fn ioc(category: IocCategory, value: &str) -> Ioc {
        Ioc {
            category,
            value: value.to_string(),
        }
    }

    fn service(search: Arc<StubSearch>, config: SearchConfig, cap: usize) -> ContextRetrievalService {
        ContextRetrievalService::new(
            search,
            config,
            Arc::new(RatePacer::from_millis(0)),
            None,
            cap,
        )
    }

    #[tokio::test]
    async fn test_per_category_cap_applies() {
        let search = Arc::new(StubSearch::new(|| Ok(InstantAnswer::default())));
        let svc = service(search.clone(), SearchConfig::default(), 1);

        let snippets = svc
            .retrieve(&[
                ioc(IocCategory::Process, "powershell.exe"),
                ioc(IocCategory::Process, "cmd.exe"),
                ioc(IocCategory::File, "payload.dll"),
            ])
            .await;

        // One process lookup plus the file lookup
        assert_eq!(snippets.len(), 2);
        assert_eq!(search.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_fallback() {
        let search = Arc::new(StubSearch::new(|| Err(SearchError::RateLimited)));
        let svc = service(search, SearchConfig::default(), 3);

        let snippets = svc.retrieve(&[ioc(IocCategory::Process, "rundll32.exe")]).await;

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "Cybersecurity indicator: rundll32.exe");
        assert!(snippets[0].source.is_none());
    }

    #[tokio::test]
    async fn test_empty_answer_yields_generic_context() {
        let search = Arc::new(StubSearch::new(|| Ok(InstantAnswer::default())));
        let svc = service(search, SearchConfig::default(), 3);

        let snippets = svc.retrieve(&[ioc(IocCategory::Domain, "evil.example")]).await;

        assert_eq!(snippets[0].text, "General cybersecurity context for: evil.example");
    }

    #[tokio::test]
    async fn test_denied_source_is_stripped() {
        let search = Arc::new(StubSearch::new(|| {
            Ok(InstantAnswer {
                heading: None,
                abstract_text: Some("Known credential dumper.".to_string()),
                definition: None,
                source_url: Some(Url::parse("https://blocked.example/page").unwrap()),
            })
        }));
        let config = SearchConfig {
            allow: vec![],
            deny: vec!["blocked.example".to_string()],
        };
        let svc = service(search, config, 3);

        let snippets = svc.retrieve(&[ioc(IocCategory::Process, "mimikatz.exe")]).await;

        assert!(snippets[0].text.contains("credential dumper"));
        assert!(snippets[0].source.is_none());
    }
}
