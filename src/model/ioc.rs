//! Indicator of Compromise types
//!
//! IoCs are produced by the LLM extraction stage and are not validated
//! structurally beyond grounding in the rule text.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category label attached to an extracted indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IocCategory {
    Process,
    File,
    IpAddress,
    RegistryKey,
    LogSource,
    EventCode,
    NetworkPort,
    Domain,
    Other,
}

impl IocCategory {
    /// Human-readable label used in prompts and the UI
    pub fn label(&self) -> &'static str {
        match self {
            IocCategory::Process => "process",
            IocCategory::File => "file",
            IocCategory::IpAddress => "ip_address",
            IocCategory::RegistryKey => "registry_key",
            IocCategory::LogSource => "log_source",
            IocCategory::EventCode => "event_code",
            IocCategory::NetworkPort => "network_port",
            IocCategory::Domain => "domain",
            IocCategory::Other => "other",
        }
    }
}

/// An indicator extracted from a SIEM rule
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ioc {
    pub category: IocCategory,
    pub value: String,
}
