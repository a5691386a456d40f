//! Validation logic for LLM relevance verdicts

use crate::model::extracted::ExtractedRelevance;

const DEFAULT_REASONING: &str = "No reasoning provided";

/// Normalize a raw relevance verdict
///
/// Confidence is clamped into [0, 1]; NaN becomes 0. Blank reasoning is
/// replaced with a placeholder so reports never carry empty cells.
pub fn normalize_verdict(verdict: ExtractedRelevance) -> ExtractedRelevance {
    let confidence = if verdict.confidence.is_nan() {
        0.0
    } else {
        verdict.confidence.clamp(0.0, 1.0)
    };

    let reasoning = if verdict.reasoning.trim().is_empty() {
        DEFAULT_REASONING.to_string()
    } else {
        verdict.reasoning.trim().to_string()
    };

    ExtractedRelevance {
        confidence,
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(confidence: f64, reasoning: &str) -> ExtractedRelevance {
        ExtractedRelevance {
            confidence,
            reasoning: reasoning.to_string(),
        }
    }

    #[test]
    fn test_in_range_verdict_unchanged() {
        let v = normalize_verdict(verdict(0.85, "strong overlap with encoded commands"));
        assert!((v.confidence - 0.85).abs() < 1e-9);
        assert_eq!(v.reasoning, "strong overlap with encoded commands");
    }

    #[test]
    fn test_confidence_clamped_high() {
        let v = normalize_verdict(verdict(1.7, "over-eager model"));
        assert!((v.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped_low() {
        let v = normalize_verdict(verdict(-0.3, "negative"));
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn test_nan_becomes_zero() {
        let v = normalize_verdict(verdict(f64::NAN, "nan"));
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn test_blank_reasoning_replaced() {
        let v = normalize_verdict(verdict(0.5, "   "));
        assert_eq!(v.reasoning, DEFAULT_REASONING);
    }
}
