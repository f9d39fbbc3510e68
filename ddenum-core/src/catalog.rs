// Static Datadog probe catalog
//
// Ordered by category, then by the order probes are worth asking in.
// Adding or removing a probe is a change to CATALOG only.

use ddenum_scanner::probe::{Category, ProbeDefinition, QueryWindow, SummaryHint};

const fn probe(
    id: &'static str,
    label: &'static str,
    path: &'static str,
    category: Category,
) -> ProbeDefinition {
    ProbeDefinition::get(id, label, path, category)
}

pub static CATALOG: &[ProbeDefinition] = &[
    // Validation only needs the API key
    probe("validate", "API Key Validation", "/api/v1/validate", Category::Validation)
        .api_key_only()
        .with_hint(SummaryHint::Validation),
    probe("org", "Organization Details", "/api/v1/org", Category::Organization)
        .with_hint(SummaryHint::Organization),
    probe("users", "List Users", "/api/v2/users", Category::Users)
        .with_hint(SummaryHint::Users),
    probe("roles", "List Roles", "/api/v2/roles", Category::Users)
        .with_hint(SummaryHint::Roles),
    probe("service_accounts", "Service Accounts", "/api/v2/service_accounts", Category::Users)
        .with_hint(SummaryHint::DataCount),
    probe("api_keys", "List API Keys", "/api/v2/api_keys", Category::Keys)
        .with_hint(SummaryHint::ApiKeys),
    probe("application_keys", "List Application Keys", "/api/v2/application_keys", Category::Keys)
        .with_hint(SummaryHint::DataCount),
    probe("hosts", "List Hosts", "/api/v1/hosts", Category::Infrastructure)
        .with_hint(SummaryHint::Hosts),
    probe("metrics", "List Metrics", "/api/v1/metrics", Category::Infrastructure)
        .with_hint(SummaryHint::Metrics)
        .with_window(QueryWindow::SinceLastHour),
    probe("dashboards", "List Dashboards", "/api/v1/dashboard", Category::Monitoring)
        .with_hint(SummaryHint::Dashboards),
    probe("monitors", "List Monitors", "/api/v1/monitor", Category::Monitoring)
        .with_hint(SummaryHint::Monitors),
    probe("events", "Recent Events", "/api/v1/events", Category::Monitoring)
        .with_hint(SummaryHint::Events)
        .with_window(QueryWindow::LastDay),
    probe("downtimes", "List Downtimes", "/api/v1/downtime", Category::Monitoring)
        .with_hint(SummaryHint::ArrayCount),
    probe("slos", "List SLOs", "/api/v1/slo", Category::Monitoring)
        .with_hint(SummaryHint::DataCount),
    probe("notebooks", "List Notebooks", "/api/v1/notebooks", Category::Monitoring)
        .with_hint(SummaryHint::DataCount),
    probe("synthetics", "Synthetic Tests", "/api/v1/synthetics/tests", Category::Monitoring)
        .with_hint(SummaryHint::SyntheticTests),
    probe("log_indexes", "Log Indexes", "/api/v1/logs/config/indexes", Category::LogsApm),
    probe("log_pipelines", "Log Pipelines", "/api/v1/logs/config/pipelines", Category::LogsApm),
    probe("apm_services", "Services", "/api/v1/services", Category::LogsApm),
    probe("rum_applications", "RUM Applications", "/api/v2/rum/applications", Category::LogsApm),
    probe("security_rules", "Security Monitoring Rules", "/api/v2/security_monitoring/rules", Category::Security),
    probe("security_signals", "Security Signals", "/api/v2/security_monitoring/signals", Category::Security),
    probe("integration_aws", "AWS Integration", "/api/v1/integration/aws", Category::Integrations),
    probe("integration_azure", "Azure Integration", "/api/v1/integration/azure", Category::Integrations),
    probe("integration_gcp", "GCP Integration", "/api/v1/integration/gcp", Category::Integrations),
    probe("integration_slack", "Slack Integration", "/api/v1/integration/slack", Category::Integrations),
    probe("integration_pagerduty", "PagerDuty Integration", "/api/v1/integration/pagerduty", Category::Integrations),
    probe(
        "integration_webhooks",
        "Webhooks Integration",
        "/api/v1/integration/webhooks/configuration/webhooks",
        Category::Integrations,
    ),
];

/// Every probe, in scan order
pub fn all() -> &'static [ProbeDefinition] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static ProbeDefinition> {
    CATALOG.iter().find(|p| p.id == id)
}

/// Probes in the given categories, catalog order preserved.
/// An empty filter selects everything.
pub fn by_category(categories: &[Category]) -> Vec<ProbeDefinition> {
    CATALOG
        .iter()
        .filter(|p| categories.is_empty() || categories.contains(&p.category))
        .cloned()
        .collect()
}

/// Categories that have at least one probe, in scan order
pub fn categories() -> Vec<Category> {
    let mut seen: Vec<Category> = Vec::new();
    for probe in CATALOG {
        if !seen.contains(&probe.category) {
            seen.push(probe.category);
        }
    }
    seen
}
