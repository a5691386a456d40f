use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

const ENV_CONFIG_PATH: &str = "RAM_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_LLM_PROVIDER: &str = "RAM_LLM_PROVIDER";
const ENV_LLM_MODEL: &str = "RAM_LLM_MODEL";
const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

/// Hosted LLM provider backing the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
}

impl LlmProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => DEFAULT_GEMINI_MODEL,
            LlmProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    /// Environment variable holding the provider API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => ENV_GEMINI_API_KEY,
            LlmProvider::Anthropic => ENV_ANTHROPIC_API_KEY,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(LlmProvider::Gemini),
            "anthropic" | "claude" => Some(LlmProvider::Anthropic),
            _ => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Gemini => write!(f, "gemini"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Search result filtering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Allowed snippet source domains (whitelist). If empty, all domains are allowed.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Denied snippet source domains (blacklist). Applied after allow list.
    #[serde(default)]
    pub deny: Vec<String>,
}

impl SearchConfig {
    /// Check if a snippet source URL is allowed based on the allow/deny lists
    pub fn is_url_allowed(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        // If deny list contains the host, reject
        if self.deny.iter().any(|d| host.contains(&d.to_lowercase())) {
            return false;
        }

        // If allow list is empty, allow all (except denied)
        if self.allow.is_empty() {
            return true;
        }

        // Otherwise, check if host matches any allow pattern
        self.allow.iter().any(|a| host.contains(&a.to_lowercase()))
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Minimum confidence for a technique mapping to be kept
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Maximum technique mappings returned in a report
    #[serde(default = "default_max_techniques")]
    pub max_techniques: usize,
    /// Candidate techniques requested from the recommendation stage
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,
    /// Indicators looked up per category during context retrieval
    #[serde(default = "default_max_iocs_per_category")]
    pub max_iocs_per_category: usize,
    /// Fixed delay between consecutive external calls within a run
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_max_techniques() -> usize {
    5
}

fn default_candidate_count() -> usize {
    11
}

fn default_max_iocs_per_category() -> usize {
    3
}

fn default_call_delay_ms() -> u64 {
    500
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            max_techniques: default_max_techniques(),
            candidate_count: default_candidate_count(),
            max_iocs_per_category: default_max_iocs_per_category(),
            call_delay_ms: default_call_delay_ms(),
        }
    }
}

/// LLM section of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmFileConfig {
    #[serde(default)]
    pub provider: Option<LlmProvider>,
    #[serde(default)]
    pub model: Option<String>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub llm: LlmFileConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub provider: LlmProvider,
    pub model: String,
    /// Server-side API key; requests may carry their own
    pub api_key: Option<String>,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        let provider = LlmProvider::default();
        Self {
            search: SearchConfig::default(),
            pipeline: PipelineConfig::default(),
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    ///
    /// Environment variables take precedence over the config file.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        // Load config file
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let provider = std::env::var(ENV_LLM_PROVIDER)
            .ok()
            .and_then(|s| {
                let parsed = LlmProvider::parse(&s);
                if parsed.is_none() {
                    tracing::warn!(value = %s, "Unrecognized LLM provider, using default");
                }
                parsed
            })
            .or(file.llm.provider)
            .unwrap_or_default();

        let model = std::env::var(ENV_LLM_MODEL)
            .ok()
            .or(file.llm.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let api_key = std::env::var(provider.api_key_env()).ok();

        Self {
            search: file.search,
            pipeline: file.pipeline,
            provider,
            model,
            api_key,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Handle empty file
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_allowed_empty_lists() {
        let config = SearchConfig::default();
        let url = Url::parse("https://attack.mitre.org/techniques/T1055/").unwrap();
        assert!(config.is_url_allowed(&url));
    }

    #[test]
    fn test_url_denied() {
        let config = SearchConfig {
            allow: vec![],
            deny: vec!["badhost.example".to_string()],
        };
        let url = Url::parse("https://badhost.example/page").unwrap();
        assert!(!config.is_url_allowed(&url));
    }

    #[test]
    fn test_allow_list_restricts() {
        let config = SearchConfig {
            allow: vec!["mitre.org".to_string()],
            deny: vec![],
        };
        assert!(config.is_url_allowed(&Url::parse("https://attack.mitre.org/x").unwrap()));
        assert!(!config.is_url_allowed(&Url::parse("https://example.com/x").unwrap()));
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let config = SearchConfig {
            allow: vec!["example.com".to_string()],
            deny: vec!["example.com".to_string()],
        };
        assert!(!config.is_url_allowed(&Url::parse("https://example.com/x").unwrap()));
    }

    #[test]
    fn test_config_file_defaults() {
        let file: ConfigFile = serde_yaml::from_str("{}").unwrap();
        assert!((file.pipeline.confidence_threshold - 0.7).abs() < 1e-9);
        assert_eq!(file.pipeline.max_techniques, 5);
        assert_eq!(file.pipeline.candidate_count, 11);
        assert_eq!(file.pipeline.max_iocs_per_category, 3);
        assert!(file.llm.provider.is_none());
    }

    #[test]
    fn test_config_file_parses_sections() {
        let yaml = r#"
search:
  deny:
    - tracker.example
pipeline:
  confidence_threshold: 0.5
  max_techniques: 10
llm:
  provider: anthropic
  model: claude-3-5-sonnet-latest
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.search.deny, vec!["tracker.example".to_string()]);
        assert!((file.pipeline.confidence_threshold - 0.5).abs() < 1e-9);
        assert_eq!(file.pipeline.max_techniques, 10);
        assert_eq!(file.llm.provider, Some(LlmProvider::Anthropic));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("gemini"), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::parse("Claude"), Some(LlmProvider::Anthropic));
        assert_eq!(LlmProvider::parse("anthropic"), Some(LlmProvider::Anthropic));
        assert_eq!(LlmProvider::parse("openai"), None);
    }
}
