// Enumeration report model

use crate::verdict::{Summary, Verdict, VerdictKind};
use chrono::{DateTime, Utc};
use ddenum_scanner::credentials::{CredentialContext, CredentialMode};
use ddenum_scanner::probe::{Category, ProbeDefinition};
use serde::Serialize;
use url::Url;

/// One catalog entry and what happened to it
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub probe: ProbeDefinition,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub elapsed_ms: u64,
}

/// Run-level facts. Never holds the keys themselves.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub tool_version: String,
    pub region: String,
    pub base_url: Url,
    pub credential_mode: CredentialMode,
    pub api_key_hint: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunMetadata {
    pub fn from_context(ctx: &CredentialContext) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            region: ctx.region_label().to_string(),
            base_url: ctx.base_url().clone(),
            credential_mode: ctx.credential_mode(),
            api_key_hint: ctx.masked_api_key(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub accessible: usize,
    pub forbidden: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub transport_failure: usize,
}

impl VerdictCounts {
    pub fn total(&self) -> usize {
        self.accessible + self.forbidden + self.not_found + self.skipped + self.transport_failure
    }

    fn record(&mut self, kind: VerdictKind) {
        match kind {
            VerdictKind::Accessible => self.accessible += 1,
            VerdictKind::Forbidden => self.forbidden += 1,
            VerdictKind::NotFound => self.not_found += 1,
            VerdictKind::Skipped => self.skipped += 1,
            VerdictKind::TransportFailure => self.transport_failure += 1,
        }
    }
}

/// Outward view of a single result: label, category, verdict, summary
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'a> {
    pub label: &'a str,
    pub category: Category,
    pub verdict: &'a Verdict,
    pub summary: Option<&'a Summary>,
}

/// Ordered results of one run, in catalog order. Immutable once finished.
#[derive(Debug, Clone, Serialize)]
pub struct EnumerationReport {
    metadata: RunMetadata,
    results: Vec<ProbeResult>,
}

impl EnumerationReport {
    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn verdicts(&self) -> Vec<&Verdict> {
        self.results.iter().map(|r| &r.verdict).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = ReportEntry<'_>> {
        self.results.iter().map(|r| ReportEntry {
            label: r.probe.label,
            category: r.probe.category,
            verdict: &r.verdict,
            summary: r.verdict.summary(),
        })
    }

    pub fn counts(&self) -> VerdictCounts {
        let mut counts = VerdictCounts::default();
        for result in &self.results {
            counts.record(result.verdict.kind());
        }
        counts
    }

    pub fn find(&self, probe_id: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|r| r.probe.id == probe_id)
    }

    /// Verdict of the first validation-category probe, if one ran
    pub fn key_validation(&self) -> Option<&Verdict> {
        self.results
            .iter()
            .find(|r| r.probe.category == Category::Validation)
            .map(|r| &r.verdict)
    }

    /// True when the key-validation probe could not even get an answer
    pub fn validation_failed(&self) -> bool {
        matches!(self.key_validation(), Some(Verdict::TransportFailure(_)))
    }

    pub fn accessible(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.verdict.is_accessible())
    }

    /// Distinct categories with at least one accessible probe
    pub fn accessible_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.accessible().map(|r| r.probe.category).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Append-only builder used while the run is in progress
#[derive(Debug)]
pub struct ReportBuilder {
    metadata: RunMetadata,
    results: Vec<ProbeResult>,
}

impl ReportBuilder {
    pub fn new(metadata: RunMetadata) -> Self {
        Self {
            metadata,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finish(mut self) -> EnumerationReport {
        self.metadata.finished_at = Some(Utc::now());
        EnumerationReport {
            metadata: self.metadata,
            results: self.results,
        }
    }
}
