//! Validation logic for LLM-extracted indicators
//!
//! Ensures that extracted indicators are grounded in the rule text;
//! a model is free to hallucinate values the rule never mentions, and
//! those must not reach the context or mapping stages.

use crate::model::extracted::ExtractedIndicators;
use crate::model::Ioc;

/// Result of grounding extracted indicators against the rule text
#[derive(Debug)]
pub struct GroundingResult {
    /// Indicators whose values occur in the rule
    pub grounded: Vec<Ioc>,
    /// Values the model produced that the rule does not contain
    pub dropped: Vec<String>,
}

/// Keep indicators whose value occurs in the rule text, case-insensitively
/// and with whitespace collapsed. Duplicate (category, value) pairs are
/// collapsed to one.
pub fn ground_indicators(extracted: &ExtractedIndicators, rule: &str) -> GroundingResult {
    let normalized_rule = normalize(rule);

    let mut grounded: Vec<Ioc> = Vec::new();
    let mut dropped = Vec::new();

    for group in &extracted.indicators {
        for value in &group.values {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            if !normalized_rule.contains(&normalize(value)) {
                dropped.push(value.to_string());
                continue;
            }

            let category = group.category.into();
            let duplicate = grounded
                .iter()
                .any(|ioc| ioc.category == category && ioc.value.eq_ignore_ascii_case(value));
            if !duplicate {
                grounded.push(Ioc {
                    category,
                    value: value.to_string(),
                });
            }
        }
    }

    GroundingResult { grounded, dropped }
}

/// Lowercase and collapse runs of whitespace to single spaces
fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
