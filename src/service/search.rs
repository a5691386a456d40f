//! Web search adapter backed by the DuckDuckGo Instant Answer API
//!
//! The instant-answer endpoint is keyless, which keeps the context stage
//! usable without a second credential. When an answer names a source page
//! but carries no abstract, the page itself is fetched and mined for a
//! snippet.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

const SEARCH_BASE_URL: &str = "https://api.duckduckgo.com";
const SEARCH_BASE_URL_ENV: &str = "RAM_SEARCH_BASE_URL";

/// Keep page-derived excerpts short; they feed a prompt, not a reader
const EXCERPT_MAX_CHARS: usize = 400;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// A distilled instant answer
#[derive(Debug, Clone, Default)]
pub struct InstantAnswer {
    pub heading: Option<String>,
    pub abstract_text: Option<String>,
    pub definition: Option<String>,
    pub source_url: Option<Url>,
}

impl InstantAnswer {
    /// Combine the answer fields into one snippet text, if any are present
    pub fn snippet_text(&self) -> Option<String> {
        let mut text = String::new();
        if let Some(ref abs) = self.abstract_text {
            text.push_str(&format!("Abstract: {} ", abs));
        }
        if let Some(ref def) = self.definition {
            text.push_str(&format!("Definition: {} ", def));
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Raw instant-answer payload; DuckDuckGo sends empty strings, not nulls
#[derive(Debug, Deserialize)]
struct InstantAnswerResponse {
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "Abstract")]
    abstract_html: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "Definition")]
    definition: String,
    #[serde(default, rename = "DefinitionURL")]
    definition_url: String,
}

impl From<InstantAnswerResponse> for InstantAnswer {
    fn from(raw: InstantAnswerResponse) -> Self {
        let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };

        let source_url = non_empty(raw.abstract_url.clone())
            .or_else(|| non_empty(raw.definition_url.clone()))
            .and_then(|u| Url::parse(&u).ok());

        Self {
            heading: non_empty(raw.heading),
            abstract_text: non_empty(raw.abstract_text).or_else(|| non_empty(raw.abstract_html)),
            definition: non_empty(raw.definition),
            source_url,
        }
    }
}

/// Trait for search providers
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Look up a query and return the best available answer
    async fn lookup(&self, query: &str) -> Result<InstantAnswer, SearchError>;
}

/// Client for the DuckDuckGo Instant Answer API
pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
}

impl DuckDuckGoClient {
    /// Create a new search client
    ///
    /// The base URL is resolved in this order:
    /// 1. `RAM_SEARCH_BASE_URL` environment variable if set
    /// 2. Default DuckDuckGo API URL
    pub fn new() -> Self {
        let resolved_url = env::var(SEARCH_BASE_URL_ENV)
            .ok()
            .unwrap_or_else(|| SEARCH_BASE_URL.to_string());

        Self {
            client: Client::builder()
                .user_agent("rule-attack-mapper/0.1")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: resolved_url,
        }
    }

    /// Fetch the answer's source page and mine a snippet from its metadata
    async fn fetch_page_snippet(&self, url: &Url) -> Result<Option<String>, SearchError> {
        tracing::debug!(url = %url, "Fetching snippet source page");

        let response = self.client.get(url.as_str()).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(url = %url, "Snippet page request rate limited");
            return Err(SearchError::RateLimited);
        }

        if !response.status().is_success() {
            return Ok(None);
        }

        let html = response.text().await?;
        Ok(extract_page_snippet(&html))
    }
}

impl Default for DuckDuckGoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn lookup(&self, query: &str) -> Result<InstantAnswer, SearchError> {
        tracing::debug!(query = %query, "Querying instant answer API");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(query = %query, "Search request rate limited");
            return Err(SearchError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(SearchError::Parse(format!(
                "Unexpected status {}",
                response.status()
            )));
        }

        let raw: InstantAnswerResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Failed to deserialize answer: {}", e)))?;

        let mut answer = InstantAnswer::from(raw);

        // No abstract but a known source page: mine the page for a snippet
        if answer.snippet_text().is_none() {
            if let Some(source) = answer.source_url.clone() {
                match self.fetch_page_snippet(&source).await {
                    Ok(Some(snippet)) => answer.abstract_text = Some(snippet),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!(url = %source, error = %e, "Snippet page fetch failed");
                    }
                }
            }
        }

        Ok(answer)
    }
}

/// Extract a snippet from a page: meta description first, then a short
/// Markdown excerpt of the body
fn extract_page_snippet(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(description) = extract_meta_description(&document) {
        return Some(description);
    }

    markdown_excerpt(html, EXCERPT_MAX_CHARS)
}

/// Extract <meta name="description"> or <meta property="og:description">
fn extract_meta_description(document: &Html) -> Option<String> {
    for selector_str in [
        "meta[name=\"description\"]",
        "meta[property=\"og:description\"]",
    ] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(el) = document.select(&selector).next() {
                if let Some(content) = el.value().attr("content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Convert the page to Markdown and keep the leading characters
fn markdown_excerpt(html: &str, max_chars: usize) -> Option<String> {
    let markdown = htmd::convert(html).ok()?;
    let trimmed = markdown.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_answer_from_raw() {
        let json = r#"{
            "Heading": "Mimikatz",
            "AbstractText": "Mimikatz is a credential dumping tool.",
            "Abstract": "Mimikatz is a credential dumping tool.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Mimikatz",
            "Definition": "",
            "DefinitionURL": ""
        }"#;
        let raw: InstantAnswerResponse = serde_json::from_str(json).unwrap();
        let answer = InstantAnswer::from(raw);

        assert_eq!(answer.heading.as_deref(), Some("Mimikatz"));
        assert_eq!(
            answer.source_url.as_ref().map(|u| u.as_str()),
            Some("https://en.wikipedia.org/wiki/Mimikatz")
        );
        assert!(answer.snippet_text().unwrap().contains("credential dumping"));
    }

    #[test]
    fn test_instant_answer_empty_fields_become_none() {
        let json = r#"{"Heading": "", "AbstractText": "", "Abstract": "", "AbstractURL": "", "Definition": "", "DefinitionURL": ""}"#;
        let raw: InstantAnswerResponse = serde_json::from_str(json).unwrap();
        let answer = InstantAnswer::from(raw);

        assert!(answer.heading.is_none());
        assert!(answer.source_url.is_none());
        assert!(answer.snippet_text().is_none());
    }

    #[test]
    fn test_snippet_text_combines_abstract_and_definition() {
        let answer = InstantAnswer {
            heading: None,
            abstract_text: Some("A tool.".to_string()),
            definition: Some("A thing.".to_string()),
            source_url: None,
        };
        let text = answer.snippet_text().unwrap();
        assert!(text.contains("Abstract: A tool."));
        assert!(text.contains("Definition: A thing."));
    }

    #[test]
    fn test_extract_meta_description() {
        let html = r#"<html><head>
            <meta name="description" content="PowerShell is a shell and scripting language.">
        </head><body><p>ignored</p></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_meta_description(&document).as_deref(),
            Some("PowerShell is a shell and scripting language.")
        );
    }

    #[test]
    fn test_extract_meta_description_falls_back_to_og() {
        let html = r#"<html><head>
            <meta property="og:description" content="From og tags.">
        </head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_meta_description(&document).as_deref(), Some("From og tags."));
    }

    #[test]
    fn test_markdown_excerpt_truncates() {
        let html = format!("<html><body><p>{}</p></body></html>", "x".repeat(1000));
        let excerpt = markdown_excerpt(&html, 100).unwrap();
        assert!(excerpt.chars().count() <= 100);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_lookup_known_term() {
        let client = DuckDuckGoClient::new();
        let result = client.lookup("mimikatz").await;
        assert!(result.is_ok());
    }
}
