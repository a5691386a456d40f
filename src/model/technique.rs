//! MITRE ATT&CK technique types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A candidate technique proposed by the recommendation stage,
/// before relevance scoring
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TechniqueCandidate {
    /// Technique or sub-technique ID, e.g. `T1055` or `T1003.001`
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A scored mapping from the analyzed rule to an ATT&CK technique
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TechniqueMapping {
    /// Technique or sub-technique ID, e.g. `T1055` or `T1003.001`
    pub id: String,
    pub name: String,
    pub description: String,
    /// Relevance confidence in [0, 1]
    pub confidence: f64,
    /// Free-text reasoning produced by the scoring stage
    pub reasoning: String,
}
