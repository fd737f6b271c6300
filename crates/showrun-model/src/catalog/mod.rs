//! Built-in demo catalogs.
//!
//! These are the fixed literal plans the demo binaries run: a nine-step agent
//! request pipeline and an eight-tool integration bench with its canned
//! output lines. Hosts are free to supply their own specs instead.

use crate::{StepSpec, ToolKind, ToolSpec};

/// The demo walkthrough of one agent request, from user input to response.
pub fn agent_pipeline() -> Vec<StepSpec> {
    vec![
        StepSpec::new("1", "User Request", 500)
            .with_description("User submits query to AI agent")
            .with_icon("user")
            .with_details(["Query parsing", "Intent recognition", "Parameter extraction"]),
        StepSpec::new("2", "Authentication", 800)
            .with_description("Validate user tokens and permissions")
            .with_icon("shield")
            .with_details(["Token validation", "Permission check", "Rate limiting"]),
        StepSpec::new("3", "Agent Processing", 1200)
            .with_description("AI agent analyzes request and plans execution")
            .with_icon("bot")
            .with_details(["Request analysis", "Tool selection", "Execution planning"]),
        StepSpec::new("4", "System Selection", 600)
            .with_description("Choose appropriate systems (Ariba, eBay, Google, etc.)")
            .with_icon("zap")
            .with_details(["System matching", "API availability check", "Resource allocation"]),
        StepSpec::new("5", "AWS Lambda Execution", 2000)
            .with_description("Execute serverless functions and code")
            .with_icon("code")
            .with_details(["Lambda preparation", "Environment setup", "Function execution"]),
        StepSpec::new("6", "External API Calls", 1500)
            .with_description("Connect to eBay, Google, Stripe, Cloudflare APIs")
            .with_icon("globe")
            .with_details(["API endpoint routing", "Request formatting", "Response parsing"]),
        StepSpec::new("7", "CRM & Database Sync", 1000)
            .with_description("Update Salesforce CRM and internal databases")
            .with_icon("database")
            .with_details(["Salesforce sync", "CRM updates", "Data validation"]),
        StepSpec::new("8", "Multi-System Coordination", 1800)
            .with_description("Coordinate between Ariba, eBay, and internal systems")
            .with_icon("message-circle")
            .with_details(["System discovery", "Data routing", "Result aggregation"]),
        StepSpec::new("9", "Response Formation", 700)
            .with_description("Compile results into user response")
            .with_icon("check-circle")
            .with_details(["Result compilation", "Response formatting", "Quality validation"]),
    ]
}

/// The demo tool bench: backend integration tooling of an agent platform.
pub fn integration_bench() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new("1", "SAP BTP Account API", ToolKind::Code).with_icon("database"),
        ToolSpec::new("2", "Backend Connection Analyzer", ToolKind::Api).with_icon("code"),
        ToolSpec::new("3", "API Gateway Generator", ToolKind::Api).with_icon("zap"),
        ToolSpec::new("4", "OAuth2 Authentication Service", ToolKind::Integration).with_icon("globe"),
        ToolSpec::new("5", "SAP HANA Database Connector", ToolKind::Database).with_icon("database"),
        ToolSpec::new("6", "Cloud Foundry Deployment", ToolKind::Integration).with_icon("zap"),
        ToolSpec::new("7", "REST API Endpoint Builder", ToolKind::Code).with_icon("code"),
        ToolSpec::new("8", "Frontend-Backend Bridge", ToolKind::Api).with_icon("globe"),
    ]
}

/// Canned result lines, positionally matched to [`integration_bench`].
pub fn bench_outputs() -> Vec<String> {
    [
        "BTP API: Connected to 3 SAP services, 247 active endpoints discovered",
        "Backend Analyzer: Found 12 microservices, mapped 89 API routes",
        "API Gateway: Generated 15 REST endpoints with OpenAPI spec",
        "OAuth2: Configured authentication, issued 156 access tokens",
        "HANA Connector: Connected to database, 73 tables mapped",
        "Cloud Foundry: Deployed 5 microservices, auto-scaling enabled",
        "REST Builder: Created 8 endpoints, response time <200ms",
        "Frontend Bridge: WebSocket connection established, real-time sync active",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn pipeline_has_nine_unique_steps() {
        let plan = agent_pipeline();
        assert_eq!(plan.len(), 9);

        let ids: HashSet<_> = plan.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), plan.len());
    }

    #[test]
    fn pipeline_planned_duration() {
        let total: u64 = agent_pipeline().iter().map(|s| s.duration_ms).sum();
        assert_eq!(total, 10_100);
    }

    #[test]
    fn bench_and_outputs_are_positionally_matched() {
        let bench = integration_bench();
        let outputs = bench_outputs();

        assert_eq!(bench.len(), 8);
        assert_eq!(outputs.len(), bench.len());

        let ids: HashSet<_> = bench.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), bench.len());
    }

    #[test]
    fn every_step_carries_detail_tags() {
        assert!(agent_pipeline().iter().all(|s| !s.details.is_empty()));
    }
}
