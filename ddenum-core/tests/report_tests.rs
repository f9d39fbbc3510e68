// Tests for report generation

use ddenum_core::catalog;
use ddenum_core::model::{EnumerationReport, ProbeResult, ReportBuilder, RunMetadata};
use ddenum_core::posture::analyze_report;
use ddenum_core::report::{
    ReportFormat, generate_json_report, generate_markdown_report, generate_text_report,
    render_report, save_report,
};
use ddenum_core::verdict::{Summary, Verdict};
use ddenum_scanner::credentials::CredentialContext;
use tempfile::TempDir;

const API_KEY: &str = "0123456789abcdef";
const APP_KEY: &str = "fedcba9876543210";

fn result(id: &str, verdict: Verdict) -> ProbeResult {
    ProbeResult {
        probe: catalog::find(id).unwrap().clone(),
        verdict,
        http_status: Some(200),
        elapsed_ms: 12,
    }
}

fn sample_report() -> EnumerationReport {
    let ctx = CredentialContext::build(API_KEY, Some(APP_KEY), "us3").unwrap();
    let mut builder = ReportBuilder::new(RunMetadata::from_context(&ctx));

    builder.push(result(
        "validate",
        Verdict::Accessible(Some(Summary::default().field("Valid", "true"))),
    ));
    builder.push(result(
        "org",
        Verdict::Accessible(Some(Summary::default().field("Name", "Acme | Corp"))),
    ));
    let mut users = Summary::with_count(12);
    users.samples = vec!["a@example.com (Active)".to_string()];
    users.remaining = 11;
    builder.push(result("users", Verdict::Accessible(Some(users))));
    builder.push(result("roles", Verdict::Forbidden { status: 403 }));
    builder.push(result("api_keys", Verdict::SkippedMissingCredential));
    builder.push(result("hosts", Verdict::NotFound));
    builder.push(result(
        "monitors",
        Verdict::TransportFailure("timeout: operation timed out".to_string()),
    ));
    builder.finish()
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("Md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("html"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contains_every_probe() {
    let report = sample_report();
    let text = generate_text_report(&report, &[]);

    for entry in report.entries() {
        assert!(text.contains(entry.label), "missing {}", entry.label);
    }
    assert!(text.contains("FORBIDDEN (403)"));
    assert!(text.contains("SKIPPED (no application key)"));
    assert!(text.contains("NOT FOUND (404)"));
    assert!(text.contains("ERROR (timeout: operation timed out)"));
}

#[test]
fn test_text_report_groups_by_category_in_order() {
    let text = generate_text_report(&sample_report(), &[]);

    let validation = text.find("## Key Validation").unwrap();
    let users = text.find("## Users & Roles").unwrap();
    let monitoring = text.find("## Monitoring").unwrap();
    assert!(validation < users);
    assert!(users < monitoring);
}

#[test]
fn test_text_report_shows_samples_and_remaining() {
    let text = generate_text_report(&sample_report(), &[]);
    assert!(text.contains("12 found"));
    assert!(text.contains("- a@example.com (Active)"));
    assert!(text.contains("... and 11 more"));
}

#[test]
fn test_text_report_masks_keys() {
    let text = generate_text_report(&sample_report(), &[]);
    assert!(!text.contains(API_KEY));
    assert!(!text.contains(APP_KEY));
    assert!(text.contains("************cdef"));
    assert!(text.contains("API key + application key"));
    assert!(text.contains("us3"));
}

#[test]
fn test_text_report_includes_findings() {
    let report = sample_report();
    let findings = analyze_report(&report);
    let text = generate_text_report(&report, &findings);

    assert!(text.contains("POSTURE FINDINGS"));
    assert!(text.contains("Identity Directory Readable"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let report = sample_report();
    let json = generate_json_report(&report, &[]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "ddenum");
    assert_eq!(value["report"]["run"]["region"], "us3");
    assert_eq!(value["report"]["run"]["credential_mode"], "api_and_application_key");
    assert_eq!(value["report"]["summary"]["total_probes"], 7);
    assert_eq!(value["report"]["summary"]["verdicts"]["accessible"], 3);
    assert_eq!(value["report"]["summary"]["verdicts"]["transport_failure"], 1);
}

#[test]
fn test_json_report_results_in_order() {
    let report = sample_report();
    let json = generate_json_report(&report, &[]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let ids: Vec<&str> = value["report"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["probe"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["validate", "org", "users", "roles", "api_keys", "hosts", "monitors"]
    );

    let roles = &value["report"]["results"][3];
    assert_eq!(roles["verdict"]["verdict"], "forbidden");
    assert_eq!(roles["verdict"]["detail"]["status"], 403);
}

#[test]
fn test_json_report_never_contains_keys() {
    let json = generate_json_report(&sample_report(), &[]).unwrap();
    assert!(!json.contains(API_KEY));
    assert!(!json.contains(APP_KEY));
}

// ============================================================================
// Markdown Report Tests
// ============================================================================

#[test]
fn test_markdown_report_table() {
    let md = generate_markdown_report(&sample_report(), &[]);

    assert!(md.starts_with("# Datadog Credential Enumeration"));
    assert!(md.contains("| Category | Probe | Path | Verdict | Summary |"));
    assert!(md.contains("`/api/v2/users`"));
    assert!(md.contains("Acme \\| Corp"));
    assert!(md.contains("- **Credentials:** API key + application key"));
}

#[test]
fn test_markdown_newlines_stay_in_one_row() {
    let ctx = CredentialContext::build(API_KEY, None, "us1").unwrap();
    let mut builder = ReportBuilder::new(RunMetadata::from_context(&ctx));
    builder.push(result(
        "org",
        Verdict::Accessible(Some(Summary::default().field("Name", "Acme\n| injected |\r\nrow"))),
    ));
    let md = generate_markdown_report(&builder.finish(), &[]);

    let row = md.lines().find(|line| line.contains("Acme")).unwrap();
    assert!(row.starts_with('|'));
    assert!(row.contains("Acme \\| injected \\| row"));
    assert!(!md.lines().any(|line| line.starts_with("row")));
    assert!(md.contains("- **Credentials:** API key only"));
}

#[test]
fn test_render_report_dispatches_on_format() {
    let report = sample_report();

    let text = render_report(ReportFormat::Text, &report, &[]).unwrap();
    assert!(text.contains("DATADOG CREDENTIAL ENUMERATION REPORT"));

    let json = render_report(ReportFormat::Json, &report, &[]).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());

    let md = render_report(ReportFormat::Markdown, &report, &[]).unwrap();
    assert!(md.contains("## Results"));
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");

    let content = generate_json_report(&sample_report(), &[]).unwrap();
    save_report(&content, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_save_report_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.txt");
    assert!(save_report("x", &path).is_err());
}
