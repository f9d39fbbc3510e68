// Tests for the enumeration aggregator

use ddenum_core::catalog::{self, CATALOG};
use ddenum_core::enumerate::{EnumerateOptions, Enumerator, ProbeResultCallback, execute_enumeration};
use ddenum_core::model::ProbeResult;
use ddenum_core::verdict::{Verdict, VerdictKind};
use ddenum_scanner::credentials::CredentialContext;
use ddenum_scanner::dispatcher::{GatingPolicy, ProbeDispatcher, gate};
use ddenum_scanner::outcome::{ProbeOutcome, TransportError, TransportErrorKind};
use ddenum_scanner::probe::{Category, ProbeDefinition, SummaryHint};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers every sent probe from a fixed script and counts the sends
struct ScriptedDispatcher {
    calls: AtomicUsize,
    answer: fn(&ProbeDefinition) -> ProbeOutcome,
}

impl ScriptedDispatcher {
    fn new(answer: fn(&ProbeDefinition) -> ProbeOutcome) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            answer,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbeDispatcher for ScriptedDispatcher {
    async fn dispatch(&self, ctx: &CredentialContext, probe: &ProbeDefinition) -> ProbeOutcome {
        if let Some(reason) = gate(GatingPolicy::Skip, ctx, probe) {
            return ProbeOutcome::skipped(probe.id, reason);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(probe)
    }
}

fn ok_empty(probe: &ProbeDefinition) -> ProbeOutcome {
    ProbeOutcome::response(probe.id, 200, Some(b"{}".to_vec()), Duration::from_millis(1))
}

fn api_key_only() -> CredentialContext {
    CredentialContext::build("0123456789abcdef", None, "us1").unwrap()
}

fn both_keys() -> CredentialContext {
    CredentialContext::build("0123456789abcdef", Some("fedcba9876543210"), "eu").unwrap()
}

const SMALL_CATALOG: [ProbeDefinition; 3] = [
    ProbeDefinition::get("validate", "API Key Validation", "/api/v1/validate", Category::Validation)
        .api_key_only(),
    ProbeDefinition::get("listUsers", "List Users", "/api/v2/users", Category::Users),
    ProbeDefinition::get("orgInfo", "Organization Details", "/api/v1/org", Category::Organization)
        .api_key_only(),
];

// ============================================================================
// Aggregation Tests
// ============================================================================

#[tokio::test]
async fn test_api_key_only_skips_app_key_probes_without_sending() {
    let enumerator = Enumerator::new(ScriptedDispatcher::new(ok_empty));
    let report = enumerator.run(&api_key_only(), &SMALL_CATALOG).await;

    let kinds: Vec<VerdictKind> = report.verdicts().iter().map(|v| v.kind()).collect();
    assert_eq!(
        kinds,
        vec![VerdictKind::Accessible, VerdictKind::Skipped, VerdictKind::Accessible]
    );
    assert_eq!(
        report.find("listUsers").map(|r| &r.verdict),
        Some(&Verdict::SkippedMissingCredential)
    );
    assert_eq!(enumerator.dispatcher().calls(), 2);
}

#[tokio::test]
async fn test_report_covers_full_catalog_in_order() {
    let enumerator = Enumerator::new(ScriptedDispatcher::new(ok_empty));
    let report = enumerator.run(&both_keys(), CATALOG).await;

    assert_eq!(report.len(), CATALOG.len());
    for (result, probe) in report.results().iter().zip(CATALOG) {
        assert_eq!(result.probe.id, probe.id);
    }
    assert_eq!(enumerator.dispatcher().calls(), CATALOG.len());
    assert_eq!(report.counts().accessible, CATALOG.len());
}

#[tokio::test]
async fn test_api_key_only_sends_only_validation() {
    let enumerator = Enumerator::new(ScriptedDispatcher::new(ok_empty));
    let report = enumerator.run(&api_key_only(), CATALOG).await;

    assert_eq!(report.len(), CATALOG.len());
    assert_eq!(enumerator.dispatcher().calls(), 1);
    assert_eq!(report.counts().skipped, CATALOG.len() - 1);
    assert!(report.key_validation().is_some_and(Verdict::is_accessible));
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    fn flaky(probe: &ProbeDefinition) -> ProbeOutcome {
        match probe.id {
            "validate" => ProbeOutcome::with_error(
                probe.id,
                TransportError::new(TransportErrorKind::Connect, "connection refused"),
                Duration::ZERO,
            ),
            "listUsers" => ProbeOutcome::response(probe.id, 403, None, Duration::ZERO),
            _ => ok_empty(probe),
        }
    }

    let enumerator = Enumerator::new(ScriptedDispatcher::new(flaky));
    let report = enumerator.run(&both_keys(), &SMALL_CATALOG).await;

    assert_eq!(report.len(), 3);
    assert_eq!(enumerator.dispatcher().calls(), 3);
    assert!(report.validation_failed());
    assert_eq!(report.verdicts()[1], &Verdict::Forbidden { status: 403 });
    assert!(report.verdicts()[2].is_accessible());
}

#[tokio::test]
async fn test_callback_sees_every_result_in_order() {
    let seen: Arc<Mutex<Vec<(usize, usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ProbeResultCallback = Arc::new(move |idx: usize, total: usize, result: &ProbeResult| {
        sink.lock()
            .unwrap()
            .push((idx, total, result.probe.id.to_string()));
    });

    let enumerator = Enumerator::new(ScriptedDispatcher::new(ok_empty)).with_result_callback(callback);
    enumerator.run(&api_key_only(), &SMALL_CATALOG).await;

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (1, 3, "validate".to_string()),
            (2, 3, "listUsers".to_string()),
            (3, 3, "orgInfo".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_metadata_never_holds_raw_keys() {
    let enumerator = Enumerator::new(ScriptedDispatcher::new(ok_empty));
    let report = enumerator.run(&both_keys(), &SMALL_CATALOG).await;

    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("0123456789abcdef"));
    assert!(!json.contains("fedcba9876543210"));
    assert_eq!(report.metadata().api_key_hint, "************cdef");
    assert_eq!(report.metadata().region, "eu");
    assert!(report.metadata().finished_at.is_some());
}

#[tokio::test]
async fn test_entries_expose_label_category_and_summary() {
    fn validated(probe: &ProbeDefinition) -> ProbeOutcome {
        ProbeOutcome::response(probe.id, 200, Some(br#"{"valid":true}"#.to_vec()), Duration::ZERO)
    }

    let probes = [SMALL_CATALOG[0].clone().with_hint(SummaryHint::Validation)];
    let enumerator = Enumerator::new(ScriptedDispatcher::new(validated));
    let report = enumerator.run(&api_key_only(), &probes).await;

    let entry = report.entries().next().unwrap();
    assert_eq!(entry.label, "API Key Validation");
    assert_eq!(entry.category, Category::Validation);
    assert_eq!(entry.summary.and_then(|s| s.get("Valid")), Some("true"));
}

// ============================================================================
// End-to-end Tests
// ============================================================================

#[tokio::test]
async fn test_execute_enumeration_against_mock_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/validate"))
        .and(header("DD-API-KEY", "0123456789abcdef"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"valid":true}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":[{"attributes":{"email":"a@example.com","status":"Active"}}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/roles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/service_accounts"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let ctx = CredentialContext::with_base_url("0123456789abcdef", Some("app-key"), &server.uri())
        .unwrap();
    let mut options = EnumerateOptions::new(ctx);
    options.categories = vec![Category::Validation, Category::Users];

    let report = execute_enumeration(options, None).await.unwrap();

    assert_eq!(report.len(), 4);
    assert_eq!(report.metadata().region, "custom");
    assert!(report.key_validation().is_some_and(Verdict::is_accessible));

    let users = report.find("users").unwrap();
    let summary = users.verdict.summary().unwrap();
    assert_eq!(summary.count, Some(1));
    assert_eq!(summary.samples, vec!["a@example.com (Active)".to_string()]);

    assert_eq!(
        report.find("roles").unwrap().verdict,
        Verdict::Forbidden { status: 401 }
    );
    assert_eq!(
        report.find("service_accounts").unwrap().verdict,
        Verdict::TransportFailure("unexpected status: 429".to_string())
    );
    assert_eq!(report.find("service_accounts").unwrap().http_status, Some(429));
}

#[tokio::test]
async fn test_execute_enumeration_unmatched_paths_are_not_found() {
    let server = MockServer::start().await;

    let ctx = CredentialContext::with_base_url("0123456789abcdef", Some("app-key"), &server.uri())
        .unwrap();
    let mut options = EnumerateOptions::new(ctx);
    options.categories = vec![Category::Integrations];

    let report = execute_enumeration(options, None).await.unwrap();

    assert_eq!(report.len(), catalog::by_category(&[Category::Integrations]).len());
    assert_eq!(report.counts().not_found, report.len());
}

#[tokio::test]
async fn test_execute_enumeration_attempt_policy_sends_without_app_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    let ctx = CredentialContext::with_base_url("0123456789abcdef", None, &server.uri()).unwrap();
    let mut options = EnumerateOptions::new(ctx);
    options.categories = vec![Category::Users];
    options.gating = GatingPolicy::Attempt;

    let report = execute_enumeration(options, None).await.unwrap();

    assert_eq!(report.counts().forbidden, 3);
    assert_eq!(report.counts().skipped, 0);
}

#[tokio::test]
async fn test_execute_enumeration_truncated_body_is_accessible_without_summary() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 500\r\n\r\n{\"valid\":");
        }
    });

    let ctx = CredentialContext::with_base_url("0123456789abcdef", None, &format!("http://{}", addr))
        .unwrap();
    let mut options = EnumerateOptions::new(ctx);
    options.categories = vec![Category::Validation];
    options.timeout = Duration::from_secs(2);

    let report = execute_enumeration(options, None).await.unwrap();

    let validate = report.find("validate").unwrap();
    assert_eq!(validate.verdict, Verdict::Accessible(None));
    assert_eq!(validate.http_status, Some(200));
    assert!(!report.validation_failed());
}

#[tokio::test]
async fn test_execute_enumeration_rejects_empty_selection() {
    let mut options = EnumerateOptions::new(api_key_only());
    options.categories = vec![Category::Misc];

    let result = execute_enumeration(options, None).await;
    assert!(result.is_err());
}
