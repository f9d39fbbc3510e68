// Passive least-privilege checks over a finished enumeration

use crate::model::EnumerationReport;
use crate::verdict::Verdict;
use ddenum_scanner::probe::Category;
use serde::{Deserialize, Serialize};

/// Categories readable before a credential counts as broadly scoped
pub const BROAD_SCOPE_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Probes that evidence the finding
    pub probe_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

fn accessible_ids(report: &EnumerationReport, ids: &[&str]) -> Vec<String> {
    report
        .accessible()
        .filter(|r| ids.contains(&r.probe.id))
        .map(|r| r.probe.id.to_string())
        .collect()
}

pub fn check_credential_inventory(report: &EnumerationReport) -> Vec<Finding> {
    let hits = accessible_ids(report, &["api_keys", "application_keys"]);
    if hits.is_empty() {
        return Vec::new();
    }

    vec![Finding {
        severity: Severity::Critical,
        title: "Credential Inventory Readable".to_string(),
        description: format!(
            "These credentials can list the organization's keys ({}). Key names and suffixes help an attacker pick further targets.",
            hits.join(", ")
        ),
        probe_ids: hits,
        remediation: Some("Remove api_keys_read / user_app_keys scopes from this application key.".to_string()),
    }]
}

pub fn check_identity_directory(report: &EnumerationReport) -> Vec<Finding> {
    let hits = accessible_ids(report, &["users", "roles", "service_accounts"]);
    if hits.is_empty() {
        return Vec::new();
    }

    vec![Finding {
        severity: Severity::High,
        title: "Identity Directory Readable".to_string(),
        description: format!(
            "User, role or service account listings are readable ({}), exposing email addresses and RBAC layout.",
            hits.join(", ")
        ),
        probe_ids: hits,
        remediation: Some("Scope the application key away from user_access_read.".to_string()),
    }]
}

pub fn check_security_monitoring(report: &EnumerationReport) -> Vec<Finding> {
    let hits = accessible_ids(report, &["security_rules", "security_signals"]);
    if hits.is_empty() {
        return Vec::new();
    }

    vec![Finding {
        severity: Severity::High,
        title: "Security Monitoring Readable".to_string(),
        description: format!(
            "Detection rules or signals are readable ({}). An attacker can learn what is and is not detected.",
            hits.join(", ")
        ),
        probe_ids: hits,
        remediation: Some("Restrict security_monitoring_* scopes to the security team's keys.".to_string()),
    }]
}

pub fn check_cloud_integrations(report: &EnumerationReport) -> Vec<Finding> {
    let hits = accessible_ids(
        report,
        &["integration_aws", "integration_azure", "integration_gcp"],
    );
    if hits.is_empty() {
        return Vec::new();
    }

    vec![Finding {
        severity: Severity::Medium,
        title: "Cloud Integration Configuration Readable".to_string(),
        description: format!(
            "Cloud integration settings are readable ({}). They reveal account, subscription or project identifiers.",
            hits.join(", ")
        ),
        probe_ids: hits,
        remediation: None,
    }]
}

pub fn check_broad_scope(report: &EnumerationReport) -> Vec<Finding> {
    let categories: Vec<Category> = report
        .accessible_categories()
        .into_iter()
        .filter(|c| *c != Category::Validation)
        .collect();

    if categories.len() < BROAD_SCOPE_THRESHOLD {
        return Vec::new();
    }

    vec![Finding {
        severity: Severity::Medium,
        title: "Broad Read Scope".to_string(),
        description: format!(
            "Accessible probes span {} categories ({}). A least-privilege key usually reaches one or two.",
            categories.len(),
            categories.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        ),
        probe_ids: report.accessible().map(|r| r.probe.id.to_string()).collect(),
        remediation: Some("Issue scoped application keys per use case.".to_string()),
    }]
}

pub fn check_key_rejected(report: &EnumerationReport) -> Vec<Finding> {
    let rejected = report
        .results()
        .iter()
        .find(|r| r.probe.category == Category::Validation && matches!(r.verdict, Verdict::Forbidden { .. }));

    match rejected {
        Some(result) => vec![Finding {
            severity: Severity::Info,
            title: "API Key Rejected".to_string(),
            description: "The validation endpoint rejected the API key. It may be revoked or belong to another region.".to_string(),
            probe_ids: vec![result.probe.id.to_string()],
            remediation: None,
        }],
        None => Vec::new(),
    }
}

/// Run every check, most severe first
pub fn analyze_report(report: &EnumerationReport) -> Vec<Finding> {
    let mut all_findings = Vec::new();

    all_findings.extend(check_credential_inventory(report));
    all_findings.extend(check_identity_directory(report));
    all_findings.extend(check_security_monitoring(report));
    all_findings.extend(check_cloud_integrations(report));
    all_findings.extend(check_broad_scope(report));
    all_findings.extend(check_key_rejected(report));

    all_findings.sort_by_key(|f| f.severity);
    all_findings
}
