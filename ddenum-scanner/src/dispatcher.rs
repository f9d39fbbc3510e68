use crate::credentials::CredentialContext;
use crate::error::{Result, ScanError};
use crate::outcome::{ProbeOutcome, SkipReason, TransportError, TransportErrorKind};
use crate::probe::ProbeDefinition;
use chrono::Utc;
use reqwest::Client;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

pub const API_KEY_HEADER: &str = "DD-API-KEY";
pub const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bodies past this size are not kept; the status still counts.
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// What to do with probes that need an application key when none was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatingPolicy {
    /// Record the probe as skipped without sending it
    #[default]
    Skip,
    /// Send it anyway with only the API key
    Attempt,
}

/// Credential-mode gate shared by every dispatcher.
pub fn gate(
    policy: GatingPolicy,
    ctx: &CredentialContext,
    probe: &ProbeDefinition,
) -> Option<SkipReason> {
    if probe.requires_app_key && !ctx.has_app_key() && policy == GatingPolicy::Skip {
        Some(SkipReason::MissingApplicationKey)
    } else {
        None
    }
}

/// Seam between the aggregator and the transport.
pub trait ProbeDispatcher {
    fn dispatch(
        &self,
        ctx: &CredentialContext,
        probe: &ProbeDefinition,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Issues one authenticated GET per probe. No retries, no redirects.
pub struct Dispatcher {
    client: Client,
    gating: GatingPolicy,
    body_limit: usize,
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "ddenum/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/trapdoorsec/ddenum)"
            ))
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            gating: GatingPolicy::Skip,
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    pub fn with_gating(mut self, gating: GatingPolicy) -> Self {
        self.gating = gating;
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    async fn send(&self, ctx: &CredentialContext, probe: &ProbeDefinition, url: Url) -> ProbeOutcome {
        let mut request = self
            .client
            .get(url)
            .header(API_KEY_HEADER, ctx.api_key())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(app_key) = ctx.app_key() {
            request = request.header(APP_KEY_HEADER, app_key);
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = TransportErrorKind::from_reqwest(&e);
                let e = e.without_url();
                warn!(probe = probe.id, kind = kind.as_str(), "Request failed: {}", e);
                return ProbeOutcome::with_error(
                    probe.id,
                    TransportError::new(kind, e.to_string()),
                    start.elapsed(),
                );
            }
        };

        let status = response.status().as_u16();
        let body = self.read_body(probe, status, response).await;
        let elapsed = start.elapsed();

        debug!(probe = probe.id, status, elapsed_ms = elapsed.as_millis() as u64, "Probe answered");
        ProbeOutcome::response(probe.id, status, body, elapsed)
    }

    /// Read at most `body_limit` bytes. The status already answers the
    /// permission question, so an oversized or unreadable body only costs
    /// the summary and never turns into a transport error.
    async fn read_body(
        &self,
        probe: &ProbeDefinition,
        status: u16,
        mut response: reqwest::Response,
    ) -> Option<Vec<u8>> {
        if let Some(length) = response.content_length()
            && length > self.body_limit as u64
        {
            debug!(probe = probe.id, status, length, "Response body over limit, not read");
            return None;
        }

        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len() + chunk.len() > self.body_limit {
                        debug!(probe = probe.id, status, "Response body over limit, dropped");
                        return None;
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(probe = probe.id, status, "Failed to read response body: {}", e.without_url());
                    return None;
                }
            }
        }

        (!body.is_empty()).then_some(body)
    }
}

impl ProbeDispatcher for Dispatcher {
    async fn dispatch(&self, ctx: &CredentialContext, probe: &ProbeDefinition) -> ProbeOutcome {
        if let Some(reason) = gate(self.gating, ctx, probe) {
            debug!(probe = probe.id, "Skipping probe, no application key");
            return ProbeOutcome::skipped(probe.id, reason);
        }

        let url = match build_probe_url(ctx.base_url(), probe) {
            Ok(url) => url,
            Err(e) => {
                return ProbeOutcome::with_error(
                    probe.id,
                    TransportError::new(TransportErrorKind::Request, e.to_string()),
                    Duration::from_secs(0),
                );
            }
        };

        debug!(probe = probe.id, method = probe.method.as_str(), url = %url, "Dispatching probe");
        self.send(ctx, probe, url).await
    }
}

/// Base URL + probe path, plus the probe's time window if it has one.
/// Any path prefix on the base URL is preserved.
pub fn build_probe_url(base: &Url, probe: &ProbeDefinition) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        probe.path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", joined, e)))?;

    if let Some(window) = probe.window {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in window.query_pairs(Utc::now()) {
            pairs.append_pair(key, &value);
        }
    }

    Ok(url)
}
