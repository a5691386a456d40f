//! Prompts for relevance scoring

use crate::model::TechniqueCandidate;

/// System prompt for relevance scoring
pub const RELEVANCE_SYSTEM_PROMPT: &str = r#"You are comparing a SIEM rule description with a MITRE ATT&CK technique for relevance.

Scoring bands:
- 0.9-1.0: Perfect match
- 0.7-0.9: Good match
- 0.5-0.7: Moderate match
- 0.0-0.5: Poor match

You must:
- Score how well the rule's detected behavior matches the technique
- Give clear, factual reasoning tied to the rule description

Do not:
- Re-describe the technique
- Reward generic overlap ("both involve Windows")
- Use meta-language about the comparison itself"#;

/// Build the relevance prompt for one candidate technique
pub fn build_relevance_prompt(rule_description: &str, candidate: &TechniqueCandidate) -> String {
    format!(
        r#"Analyze how well the SIEM rule matches the attack technique. Provide a confidence score between 0.0 and 1.0 and your reasoning.

## Rule Description

{rule_description}

## Technique

{id} - {name}
{description}"#,
        rule_description = rule_description,
        id = candidate.id,
        name = candidate.name,
        description = candidate.description
    )
}
