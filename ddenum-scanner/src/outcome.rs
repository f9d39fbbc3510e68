use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Failure classes that never produced an HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Timeout,
    /// DNS resolution, refused or reset connections, TLS handshake
    Connect,
    Request,
    /// Body failure before any status arrived. Once a status is in hand an
    /// unreadable body is dropped and the status kept.
    Body,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "other",
        }
    }

    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else if error.is_request() || error.is_builder() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.detail)
    }
}

/// Why a probe was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingApplicationKey,
}

/// Raw result of dispatching one probe. Produced once, never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub probe_id: String,
    pub http_status: Option<u16>,
    pub transport_error: Option<TransportError>,
    #[serde(skip)]
    pub raw_body: Option<Vec<u8>>,
    pub skip: Option<SkipReason>,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    /// A probe that received an HTTP response
    pub fn response(probe_id: &str, status: u16, body: Option<Vec<u8>>, elapsed: Duration) -> Self {
        Self {
            probe_id: probe_id.to_string(),
            http_status: Some(status),
            transport_error: None,
            raw_body: body,
            skip: None,
            elapsed,
        }
    }

    pub fn with_error(probe_id: &str, error: TransportError, elapsed: Duration) -> Self {
        Self {
            probe_id: probe_id.to_string(),
            http_status: None,
            transport_error: Some(error),
            raw_body: None,
            skip: None,
            elapsed,
        }
    }

    /// Sentinel for a probe that was never sent
    pub fn skipped(probe_id: &str, reason: SkipReason) -> Self {
        Self {
            probe_id: probe_id.to_string(),
            http_status: None,
            transport_error: None,
            raw_body: None,
            skip: Some(reason),
            elapsed: Duration::from_secs(0),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skip.is_some()
    }

    pub fn body_text(&self) -> Option<String> {
        self.raw_body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_sentinel_has_no_status_or_error() {
        let outcome = ProbeOutcome::skipped("users", SkipReason::MissingApplicationKey);
        assert!(outcome.is_skipped());
        assert!(outcome.http_status.is_none());
        assert!(outcome.transport_error.is_none());
        assert!(outcome.raw_body.is_none());
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new(TransportErrorKind::Timeout, "operation timed out");
        assert_eq!(err.to_string(), "timeout: operation timed out");
    }
}
