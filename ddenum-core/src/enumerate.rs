use crate::catalog;
use crate::classify::classify;
use crate::model::{EnumerationReport, ProbeResult, ReportBuilder, RunMetadata};
use ddenum_scanner::credentials::CredentialContext;
use ddenum_scanner::dispatcher::{DEFAULT_TIMEOUT, Dispatcher, GatingPolicy, ProbeDispatcher};
use ddenum_scanner::error::{Result, ScanError};
use ddenum_scanner::probe::{Category, ProbeDefinition};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span};

/// Options for configuring an enumeration run
#[derive(Debug, Clone)]
pub struct EnumerateOptions {
    pub context: CredentialContext,
    /// Empty means every category
    pub categories: Vec<Category>,
    pub timeout: Duration,
    pub gating: GatingPolicy,
}

impl EnumerateOptions {
    pub fn new(context: CredentialContext) -> Self {
        Self {
            context,
            categories: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            gating: GatingPolicy::Skip,
        }
    }
}

/// Called after each probe with (position, total, result)
pub type ProbeResultCallback = Arc<dyn Fn(usize, usize, &ProbeResult) + Send + Sync>;

/// Drives a catalog through dispatch and classification, one probe at a time.
pub struct Enumerator<D> {
    dispatcher: D,
    result_callback: Option<ProbeResultCallback>,
}

impl<D: ProbeDispatcher> Enumerator<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            result_callback: None,
        }
    }

    pub fn with_result_callback(mut self, callback: ProbeResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Visit every probe exactly once, in the order given. A failed probe is
    /// recorded and the run moves on.
    pub async fn run(&self, ctx: &CredentialContext, probes: &[ProbeDefinition]) -> EnumerationReport {
        let span = info_span!(
            "enumerate",
            region = ctx.region_label(),
            mode = ctx.credential_mode().as_str(),
            probes = probes.len()
        );
        self.run_sequential(ctx, probes).instrument(span).await
    }

    async fn run_sequential(&self, ctx: &CredentialContext, probes: &[ProbeDefinition]) -> EnumerationReport {
        info!("Starting enumeration against {}", ctx.base_url());

        let mut builder = ReportBuilder::new(RunMetadata::from_context(ctx));
        let total = probes.len();

        for (idx, probe) in probes.iter().enumerate() {
            let outcome = self.dispatcher.dispatch(ctx, probe).await;
            let verdict = classify(&outcome, probe);
            debug!(probe = probe.id, verdict = verdict.kind().as_str(), "Classified");

            let result = ProbeResult {
                probe: probe.clone(),
                verdict,
                http_status: outcome.http_status,
                elapsed_ms: outcome.elapsed.as_millis() as u64,
            };

            if let Some(ref callback) = self.result_callback {
                callback(idx + 1, total, &result);
            }
            builder.push(result);
        }

        let report = builder.finish();
        let counts = report.counts();
        info!(
            accessible = counts.accessible,
            forbidden = counts.forbidden,
            not_found = counts.not_found,
            skipped = counts.skipped,
            failed = counts.transport_failure,
            "Enumeration complete"
        );
        report
    }
}

/// Execute an enumeration with the given options against the built-in catalog
pub async fn execute_enumeration(
    options: EnumerateOptions,
    result_callback: Option<ProbeResultCallback>,
) -> Result<EnumerationReport> {
    let EnumerateOptions {
        context,
        categories,
        timeout,
        gating,
    } = options;

    let probes = catalog::by_category(&categories);
    if probes.is_empty() {
        return Err(ScanError::Other(
            "No probes match the selected categories".to_string(),
        ));
    }

    let dispatcher = Dispatcher::with_timeout(timeout)?.with_gating(gating);
    let mut enumerator = Enumerator::new(dispatcher);
    if let Some(callback) = result_callback {
        enumerator = enumerator.with_result_callback(callback);
    }

    Ok(enumerator.run(&context, &probes).await)
}
