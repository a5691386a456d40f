//! Contextual snippets retrieved for extracted indicators

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

/// A piece of web-derived context associated with one indicator
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContextSnippet {
    /// The indicator value this snippet was retrieved for
    pub ioc: String,
    /// Snippet text (abstract, definition, or page excerpt)
    pub text: String,
    /// Where the snippet came from, when the search provider reported a source
    pub source: Option<Url>,
}

impl ContextSnippet {
    /// Placeholder snippet used when the search lookup fails
    pub fn fallback(ioc: &str) -> Self {
        Self {
            ioc: ioc.to_string(),
            text: format!("Cybersecurity indicator: {}", ioc),
            source: None,
        }
    }
}
