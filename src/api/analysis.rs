//! REST API endpoints for rule analysis

use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::api::error::ApiError;
use crate::model::{
    AnalysisReport, AnalysisStats, ContextSnippet, Ioc, IocCategory, TechniqueMapping,
};
use crate::service::{AnalysisRequest, AnalysisService};

/// Request body for rule analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// SIEM rule text in any query language (Splunk SPL, Elasticsearch DSL, KQL, ...)
    pub rule: String,
    /// Provider API key; falls back to the server-configured key when absent
    #[serde(default)]
    pub api_key: Option<String>,
    /// Minimum confidence for a technique mapping to be kept (default from config)
    #[serde(default)]
    pub confidence_threshold: Option<f64>,
    /// Maximum technique mappings in the response (default from config)
    #[serde(default)]
    pub max_techniques: Option<usize>,
}

/// A bundled example rule for the UI
#[derive(Debug, Serialize, ToSchema)]
pub struct ExampleRule {
    pub name: String,
    pub rule: String,
}

/// Analyze a SIEM rule and map it to ATT&CK techniques
#[utoipa::path(
    post,
    path = "/v1/analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisReport),
        (status = 400, description = "Empty rule"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 502, description = "Upstream provider error")
    ),
    tag = "analysis"
)]
#[post("/v1/analysis")]
pub async fn analyze_rule(
    service: web::Data<Arc<AnalysisService>>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    tracing::info!(rule_length = body.rule.len(), "Received analysis request");

    let report = service
        .analyze(AnalysisRequest {
            rule: body.rule,
            api_key: body.api_key,
            confidence_threshold: body.confidence_threshold,
            max_techniques: body.max_techniques,
        })
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// List bundled example rules
#[utoipa::path(
    get,
    path = "/v1/examples",
    responses(
        (status = 200, description = "Example rules", body = [ExampleRule])
    ),
    tag = "analysis"
)]
#[get("/v1/examples")]
pub async fn list_examples() -> HttpResponse {
    HttpResponse::Ok().json(example_rules())
}

/// The example rules shipped with the UI
pub fn example_rules() -> Vec<ExampleRule> {
    vec![
        ExampleRule {
            name: "Splunk - Process Creation".to_string(),
            rule: r#"index=main sourcetype="WinEventLog:Security" EventCode=4688 | search process_name="*powershell.exe*" command_line="*-EncodedCommand*" | stats count by host, user, process_name, command_line"#
                .to_string(),
        },
        ExampleRule {
            name: "Splunk - Registry Modification".to_string(),
            rule: r#"index=main sourcetype="WinEventLog:System" | search registry_path="*\Software\Microsoft\Windows\CurrentVersion\Run\*" | stats count by host, registry_path, registry_value"#
                .to_string(),
        },
        ExampleRule {
            name: "Elasticsearch - Network Connection".to_string(),
            rule: r#"GET /logs/_search { "query": { "bool": { "must": [ {"term": {"event_type": "network"}}, {"range": {"destination_port": {"gte": 4444, "lte": 4445}}} ] } } }"#
                .to_string(),
        },
    ]
}

/// OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_rule,
        list_examples,
        crate::api::health::liveness,
        crate::api::health::readiness
    ),
    components(schemas(
        AnalyzeRequest,
        ExampleRule,
        AnalysisReport,
        AnalysisStats,
        TechniqueMapping,
        Ioc,
        IocCategory,
        ContextSnippet
    )),
    tags(
        (name = "analysis", description = "Rule analysis endpoints"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_rule).service(list_examples);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_rules_are_nonempty() {
        let examples = example_rules();
        assert_eq!(examples.len(), 3);
        assert!(examples.iter().all(|e| !e.rule.trim().is_empty()));
    }
}
