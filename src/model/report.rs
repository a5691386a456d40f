//! Analysis report assembled by the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{ContextSnippet, Ioc, TechniqueMapping};

/// Confidence at or above which a mapping counts as "high confidence"
/// in the summary statistics
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Full result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisReport {
    /// Natural-language description of what the rule detects
    pub rule_description: String,
    /// MITRE ATT&CK data source the rule draws on
    pub data_source: String,
    /// Indicators extracted from the rule
    pub iocs: Vec<Ioc>,
    /// Context snippets retrieved for the indicators
    pub context: Vec<ContextSnippet>,
    /// Scored technique mappings, sorted by descending confidence and
    /// truncated to the configured display maximum
    pub techniques: Vec<TechniqueMapping>,
    pub stats: AnalysisStats,
    /// Model that produced the LLM stages
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Summary statistics over the scored mappings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisStats {
    /// Mappings at or above the confidence threshold, before truncation
    pub techniques_found: usize,
    pub avg_confidence: f64,
    /// Mappings with confidence >= 0.8
    pub high_confidence: usize,
}

impl AnalysisStats {
    /// Compute statistics from the full (untruncated) mapping list
    pub fn from_mappings(mappings: &[TechniqueMapping]) -> Self {
        let avg_confidence = if mappings.is_empty() {
            0.0
        } else {
            mappings.iter().map(|m| m.confidence).sum::<f64>() / mappings.len() as f64
        };

        Self {
            techniques_found: mappings.len(),
            avg_confidence,
            high_confidence: mappings
                .iter()
                .filter(|m| m.confidence >= HIGH_CONFIDENCE_THRESHOLD)
                .count(),
        }
    }
}
