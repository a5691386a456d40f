//! Prompts for rule translation

use crate::model::{ContextSnippet, Ioc};

/// System prompt for rule translation
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are translating a SIEM detection rule into natural language for security analysts.

You must:
- Explain what the rule detects and why it matters
- Combine syntactic information from the rule with the supplied contextual information
- Focus on the attack behavior being detected

Do not:
- Speculate beyond the rule and the provided context
- Reproduce the rule syntax verbatim
- Add remediation advice"#;

/// Build the translation prompt from the rule and prior-stage outputs
pub fn build_translation_prompt(rule: &str, iocs: &[Ioc], context: &[ContextSnippet]) -> String {
    let iocs_details = if iocs.is_empty() {
        "No indicators were extracted from the rule.".to_string()
    } else {
        iocs.iter()
            .map(|ioc| format!("- [{}] {}", ioc.category.label(), ioc.value))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let context_details = if context.is_empty() {
        "No contextual information available.".to_string()
    } else {
        context
            .iter()
            .map(|snippet| {
                let source = snippet
                    .source
                    .as_ref()
                    .map(|url| format!(" (source: {})", url))
                    .unwrap_or_default();
                format!("- {}: {}{}", snippet.ioc, snippet.text, source)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Convert the following SIEM rule into a comprehensive natural language description of the behavior it detects.

## Rule

{rule}

## Extracted Indicators

{iocs_details}

## Contextual Information

{context_details}

---

Write a description a security analyst can act on. Cover what is being monitored, which indicators matter, and what attack behavior the rule is meant to surface."#,
        rule = rule,
        iocs_details = iocs_details,
        context_details = context_details
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IocCategory;

    #[test]
    fn test_prompt_includes_rule_and_indicators() {
        let iocs = vec![Ioc {
            category: IocCategory::Process,
            value: "powershell.exe".to_string(),
        }];
        let prompt = build_translation_prompt("index=main process_name=powershell.exe", &iocs, &[]);

        assert!(prompt.contains("index=main"));
        assert!(prompt.contains("[process] powershell.exe"));
        assert!(prompt.contains("No contextual information available."));
    }

    #[test]
    fn test_prompt_handles_empty_stages() {
        let prompt = build_translation_prompt("some rule", &[], &[]);
        assert!(prompt.contains("No indicators were extracted"));
    }
}
