pub mod analysis;
pub mod cache;
pub mod cache_keys;
pub mod context;
pub mod datasource;
pub mod extraction;
pub mod llm;
pub mod pacing;
pub mod recommendation;
pub mod relevance;
pub mod search;
pub mod translation;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisService};
pub use cache::AnalysisCache;
pub use llm::LlmClient;
pub use search::DuckDuckGoClient;
