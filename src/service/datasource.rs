//! MITRE ATT&CK data source identification
//!
//! Stage 4 of the pipeline. This stage is deterministic: the rule
//! description is matched against a keyword table, first hit wins.

/// Keyword to data-source table, checked in order
const DATA_SOURCES: &[(&str, &str)] = &[
    ("process", "Command: Command Execution"),
    ("registry", "Windows Registry: Windows Registry Key Modification"),
    ("file", "File: File Creation"),
    ("network", "Network Traffic: Network Traffic Flow"),
    ("endpoint", "Process: Process Creation"),
    ("authentication", "Logon Session: Logon Session Creation"),
    ("service", "Service: Service Creation"),
];

/// Fallback when no keyword matches
const DEFAULT_DATA_SOURCE: &str = "Process: Process Creation";

/// Identify the MITRE ATT&CK data source a rule draws on
pub fn identify_data_source(rule_description: &str) -> &'static str {
    let description_lower = rule_description.to_lowercase();

    for (keyword, data_source) in DATA_SOURCES {
        if description_lower.contains(keyword) {
            return data_source;
        }
    }

    DEFAULT_DATA_SOURCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_keyword() {
        assert_eq!(
            identify_data_source("The rule monitors process creation events"),
            "Command: Command Execution"
        );
    }

    #[test]
    fn test_registry_keyword() {
        assert_eq!(
            identify_data_source("Detects Registry run key persistence"),
            "Windows Registry: Windows Registry Key Modification"
        );
    }

    #[test]
    fn test_network_keyword() {
        assert_eq!(
            identify_data_source("Flags outbound network connections to unusual ports"),
            "Network Traffic: Network Traffic Flow"
        );
    }

    #[test]
    fn test_table_order_wins() {
        // Both "process" and "network" appear; "process" is checked first
        assert_eq!(
            identify_data_source("process spawning a network connection"),
            "Command: Command Execution"
        );
    }

    #[test]
    fn test_default_when_no_keyword() {
        assert_eq!(identify_data_source("something unrelated"), DEFAULT_DATA_SOURCE);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            identify_data_source("AUTHENTICATION failures spike"),
            "Logon Session: Logon Session Creation"
        );
    }
}
