//! Structured output types the LLM stages are asked to produce
//!
//! These carry the JSON Schema handed to the model; conversion into domain
//! types happens in the stage services after validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::IocCategory;

/// Stage 1 output: indicators grouped by category
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedIndicators {
    pub indicators: Vec<ExtractedIndicatorGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedIndicatorGroup {
    pub category: ExtractedCategory,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedCategory {
    Process,
    File,
    IpAddress,
    RegistryKey,
    LogSource,
    EventCode,
    NetworkPort,
    Domain,
    Other,
}

impl From<ExtractedCategory> for IocCategory {
    fn from(category: ExtractedCategory) -> Self {
        match category {
            ExtractedCategory::Process => IocCategory::Process,
            ExtractedCategory::File => IocCategory::File,
            ExtractedCategory::IpAddress => IocCategory::IpAddress,
            ExtractedCategory::RegistryKey => IocCategory::RegistryKey,
            ExtractedCategory::LogSource => IocCategory::LogSource,
            ExtractedCategory::EventCode => IocCategory::EventCode,
            ExtractedCategory::NetworkPort => IocCategory::NetworkPort,
            ExtractedCategory::Domain => IocCategory::Domain,
            ExtractedCategory::Other => IocCategory::Other,
        }
    }
}

/// Stage 5 output: candidate techniques
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedCandidates {
    pub techniques: Vec<ExtractedCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedCandidate {
    /// MITRE ATT&CK technique or sub-technique ID, e.g. "T1055" or "T1003.001"
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Stage 6 output: relevance verdict for a single candidate
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedRelevance {
    /// Relevance score between 0.0 and 1.0
    pub confidence: f64,
    /// Factual justification for the score
    pub reasoning: String,
}
