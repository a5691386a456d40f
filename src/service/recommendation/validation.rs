//! Validation logic for LLM-recommended techniques
//!
//! The model occasionally emits tactic IDs, prose in the ID field, or the
//! same technique twice; only well-formed, unique candidates go forward
//! to relevance scoring.

use regex::Regex;

use crate::model::extracted::ExtractedCandidates;
use crate::model::TechniqueCandidate;

/// Result of candidate validation
#[derive(Debug)]
pub struct CandidateValidationResult {
    /// Candidates with well-formed, unique technique IDs
    pub valid: Vec<TechniqueCandidate>,
    /// IDs that were malformed or duplicated
    pub rejected: Vec<String>,
}

/// Validate recommended candidates
///
/// Checks:
/// 1. Technique ID matches `T####` or `T####.###`
/// 2. Name is non-empty
/// 3. IDs are unique (first occurrence wins)
pub fn validate_candidates(extracted: &ExtractedCandidates) -> CandidateValidationResult {
    let id_pattern = Regex::new(r"^T\d{4}(\.\d{3})?$").unwrap();

    let mut valid: Vec<TechniqueCandidate> = Vec::new();
    let mut rejected = Vec::new();

    for candidate in &extracted.techniques {
        let id = candidate.id.trim().to_uppercase();

        if !id_pattern.is_match(&id) {
            rejected.push(candidate.id.clone());
            continue;
        }

        if candidate.name.trim().is_empty() {
            rejected.push(candidate.id.clone());
            continue;
        }

        if valid.iter().any(|existing| existing.id == id) {
            rejected.push(candidate.id.clone());
            continue;
        }

        valid.push(TechniqueCandidate {
            id,
            name: candidate.name.trim().to_string(),
            description: candidate.description.trim().to_string(),
        });
    }

    CandidateValidationResult { valid, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::extracted::ExtractedCandidate;

    fn candidates(entries: Vec<(&str, &str)>) -> ExtractedCandidates {
        ExtractedCandidates {
            techniques: entries
                .into_iter()
                .map(|(id, name)| ExtractedCandidate {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: "desc".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_technique_id() {
        let result = validate_candidates(&candidates(vec![("T1055", "Process Injection")]));
        assert_eq!(result.valid.len(), 1);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_valid_sub_technique_id() {
        let result = validate_candidates(&candidates(vec![("T1003.001", "LSASS Memory")]));
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].id, "T1003.001");
    }

    #[test]
    fn test_lowercase_id_is_normalized() {
        let result = validate_candidates(&candidates(vec![("t1059", "Command Interpreter")]));
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].id, "T1059");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        let result = validate_candidates(&candidates(vec![
            ("TA0002", "Execution"),
            ("T105", "Too short"),
            ("T1055.1", "Bad sub id"),
            ("Process Injection", "Prose in id"),
        ]));
        assert!(result.valid.is_empty());
        assert_eq!(result.rejected.len(), 4);
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let result = validate_candidates(&candidates(vec![
            ("T1055", "Process Injection"),
            ("T1055", "Process Injection again"),
        ]));
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = validate_candidates(&candidates(vec![("T1055", "  ")]));
        assert!(result.valid.is_empty());
    }
}
