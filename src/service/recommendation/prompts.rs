//! Prompts for technique recommendation

/// System prompt for technique recommendation
pub const RECOMMENDATION_SYSTEM_PROMPT: &str = r#"You are a cybersecurity expert mapping SIEM detection rules to MITRE ATT&CK techniques.

You must:
- Recommend techniques matching the attack behaviors the rule would detect
- Use real MITRE ATT&CK technique IDs (like T1055, T1003.001)
- Prioritize techniques that match the specific behaviors described
- Base recommendations on the rule description only

Do not:
- Invent technique IDs
- Recommend tactics (TAxxxx identifiers) in place of techniques
- Pad the list with loosely related techniques"#;

/// Build the recommendation prompt from the rule description
pub fn build_recommendation_prompt(rule_description: &str, candidate_count: usize) -> String {
    format!(
        r#"Based on the rule description below, recommend the top {candidate_count} most probable MITRE ATT&CK techniques or sub-techniques that match this detection rule. Focus on what attack behaviors this rule would detect.

## Rule Description

{rule_description}

---

For each technique provide its id, name, and a one-to-two sentence description of the adversary behavior."#,
        candidate_count = candidate_count,
        rule_description = rule_description
    )
}
