//! Prompts for indicator extraction

/// System prompt for IoC extraction
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a cybersecurity specialist analyzing SIEM detection rules.

Your task is to identify and extract all Indicators of Compromise (IoCs) from a provided SIEM rule.

## Critical Rules

1. **Only extract values that literally occur in the rule text.**
   - Do not invent, expand, or normalize indicators.
   - "powershell.exe" in the rule stays "powershell.exe" in the output.

2. **Assign each value exactly one category.**
   - process: executable or process names
   - file: file names and file paths
   - ip_address: IPv4/IPv6 addresses or CIDR ranges
   - registry_key: Windows registry paths
   - log_source: index, sourcetype, or log channel names
   - event_code: event IDs or event codes
   - network_port: port numbers or port ranges
   - domain: domain names or URLs
   - other: anything indicator-like that fits no category above

3. **Prefer fewer, concrete indicators over exhaustive token lists.**
   - Field names, query keywords, and operators are NOT indicators.
   - "stats count by host" contains no indicators.

Return an empty indicators array if the rule contains no indicators."#;

/// Build extraction prompt from rule text
pub fn build_extraction_prompt(rule: &str) -> String {
    format!(
        r#"Extract all Indicators of Compromise from the following SIEM rule.

## Rule

{}

---

Group the indicators by category. Every value must appear verbatim in the rule text above."#,
        rule
    )
}
