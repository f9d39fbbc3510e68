// Response classification: raw probe outcome -> verdict

use crate::verdict::{Summary, Verdict};
use ddenum_scanner::outcome::ProbeOutcome;
use ddenum_scanner::probe::{ProbeDefinition, SummaryHint};
use serde_json::Value;

const USER_SAMPLES: usize = 10;
const METRIC_SAMPLES: usize = 10;
const DEFAULT_SAMPLES: usize = 5;

/// Classify one outcome. Total and pure: every outcome maps to exactly one
/// verdict, and the body only ever affects the summary.
pub fn classify(outcome: &ProbeOutcome, probe: &ProbeDefinition) -> Verdict {
    if outcome.is_skipped() {
        return Verdict::SkippedMissingCredential;
    }

    if let Some(ref error) = outcome.transport_error {
        return Verdict::TransportFailure(error.to_string());
    }

    match outcome.http_status {
        Some(200..=299) => Verdict::Accessible(extract_summary(probe.hint, outcome.raw_body.as_deref())),
        Some(status @ (401 | 403)) => Verdict::Forbidden { status },
        Some(404) => Verdict::NotFound,
        Some(status) => Verdict::TransportFailure(format!("unexpected status: {}", status)),
        None => Verdict::TransportFailure("no response".to_string()),
    }
}

/// Best-effort summary. Anything unexpected in the body yields `None`.
pub fn extract_summary(hint: SummaryHint, body: Option<&[u8]>) -> Option<Summary> {
    if hint == SummaryHint::None {
        return None;
    }

    let json: Value = serde_json::from_slice(body?).ok()?;

    match hint {
        SummaryHint::None => None,
        SummaryHint::Validation => {
            let valid = scalar(&json, "valid")?;
            Some(Summary::default().field("Valid", valid))
        }
        SummaryHint::Organization => {
            let org = json.get("org")?;
            let mut summary = Summary::default();
            for (key, name) in [("name", "Name"), ("public_id", "Public ID"), ("created", "Created")] {
                if let Some(value) = scalar(org, key) {
                    summary = summary.field(name, value);
                }
            }
            (!summary.is_empty()).then_some(summary)
        }
        SummaryHint::Users => {
            let users = json.get("data")?.as_array()?;
            Some(sampled(users, users.len(), USER_SAMPLES, |user| {
                let attrs = user.get("attributes").unwrap_or(&Value::Null);
                format!(
                    "{} ({})",
                    scalar_or_na(attrs, "email"),
                    scalar_or_na(attrs, "status")
                )
            }))
        }
        SummaryHint::Roles => {
            let roles = json.get("data")?.as_array()?;
            Some(sampled(roles, roles.len(), DEFAULT_SAMPLES, |role| {
                scalar_or_na(role.get("attributes").unwrap_or(&Value::Null), "name")
            }))
        }
        SummaryHint::ApiKeys => {
            let keys = json.get("data")?.as_array()?;
            Some(sampled(keys, keys.len(), DEFAULT_SAMPLES, |key| {
                let attrs = key.get("attributes").unwrap_or(&Value::Null);
                format!(
                    "{} (last4 ...{})",
                    scalar_or_na(attrs, "name"),
                    scalar_or_na(attrs, "last4")
                )
            }))
        }
        SummaryHint::Hosts => {
            let hosts = json.get("host_list").and_then(Value::as_array);
            let total = json
                .get("total_matching")
                .and_then(Value::as_u64)
                .map(|t| t as usize)
                .or_else(|| hosts.map(|h| h.len()))?;
            let empty = Vec::new();
            Some(sampled(hosts.unwrap_or(&empty), total, DEFAULT_SAMPLES, |host| {
                let apps: Vec<&str> = host
                    .get("apps")
                    .and_then(Value::as_array)
                    .map(|apps| apps.iter().filter_map(Value::as_str).take(3).collect())
                    .unwrap_or_default();
                format!("{} (Apps: {})", scalar_or_na(host, "name"), apps.join(", "))
            }))
        }
        SummaryHint::Metrics => {
            let metrics = json.get("metrics")?.as_array()?;
            Some(sampled(metrics, metrics.len(), METRIC_SAMPLES, |metric| {
                metric.as_str().map(String::from).unwrap_or_else(|| metric.to_string())
            }))
        }
        SummaryHint::Dashboards => {
            let dashboards = json.get("dashboards")?.as_array()?;
            Some(sampled(dashboards, dashboards.len(), DEFAULT_SAMPLES, |dash| {
                format!("{} (ID: {})", scalar_or_na(dash, "title"), scalar_or_na(dash, "id"))
            }))
        }
        SummaryHint::Monitors => {
            let monitors = json.as_array()?;
            Some(sampled(monitors, monitors.len(), DEFAULT_SAMPLES, |mon| {
                format!("{} (Type: {})", scalar_or_na(mon, "name"), scalar_or_na(mon, "type"))
            }))
        }
        SummaryHint::Events => count_of(json.get("events")?),
        SummaryHint::SyntheticTests => count_of(json.get("tests")?),
        SummaryHint::DataCount => count_of(json.get("data")?),
        SummaryHint::ArrayCount => count_of(&json),
    }
}

fn count_of(value: &Value) -> Option<Summary> {
    value.as_array().map(|items| Summary::with_count(items.len()))
}

/// Count plus the first `limit` items rendered by `render`
fn sampled<F>(items: &[Value], total: usize, limit: usize, render: F) -> Summary
where
    F: Fn(&Value) -> String,
{
    let samples: Vec<String> = items.iter().take(limit).map(render).collect();
    Summary {
        count: Some(total),
        fields: Vec::new(),
        remaining: total.saturating_sub(samples.len()),
        samples,
    }
}

/// String, number or bool field as text
fn scalar(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_or_na(value: &Value, key: &str) -> String {
    scalar(value, key).unwrap_or_else(|| "N/A".to_string())
}
