use serde::{Deserialize, Serialize};
use std::fmt;

/// Extracted highlights from an accessible probe's response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<SummaryField>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub samples: Vec<String>,
    /// Items counted but not sampled
    #[serde(default)]
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryField {
    pub name: String,
    pub value: String,
}

impl Summary {
    pub fn with_count(count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(SummaryField {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.fields.is_empty() && self.samples.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(count) = self.count {
            parts.push(format!("{} found", count));
        }
        for field in &self.fields {
            parts.push(format!("{}: {}", field.name, field.value));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Classified outcome of one probe. Closed set, consumers match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    /// 2xx. The summary is best effort; `None` never weakens the verdict.
    Accessible(Option<Summary>),
    /// 401 or 403
    Forbidden { status: u16 },
    NotFound,
    SkippedMissingCredential,
    /// No usable HTTP answer: timeout, DNS, connection, or an unexpected status
    TransportFailure(String),
}

impl Verdict {
    pub fn kind(&self) -> VerdictKind {
        match self {
            Verdict::Accessible(_) => VerdictKind::Accessible,
            Verdict::Forbidden { .. } => VerdictKind::Forbidden,
            Verdict::NotFound => VerdictKind::NotFound,
            Verdict::SkippedMissingCredential => VerdictKind::Skipped,
            Verdict::TransportFailure(_) => VerdictKind::TransportFailure,
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, Verdict::Accessible(_))
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Verdict::Accessible(summary) => summary.as_ref(),
            _ => None,
        }
    }

    /// Short label for console and tabular output
    pub fn label(&self) -> String {
        match self {
            Verdict::Accessible(_) => "ACCESSIBLE".to_string(),
            Verdict::Forbidden { status: 401 } => "UNAUTHORIZED (401)".to_string(),
            Verdict::Forbidden { status } => format!("FORBIDDEN ({})", status),
            Verdict::NotFound => "NOT FOUND (404)".to_string(),
            Verdict::SkippedMissingCredential => "SKIPPED (no application key)".to_string(),
            Verdict::TransportFailure(reason) => format!("ERROR ({})", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Accessible,
    Forbidden,
    NotFound,
    Skipped,
    TransportFailure,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Accessible => "accessible",
            VerdictKind::Forbidden => "forbidden",
            VerdictKind::NotFound => "not_found",
            VerdictKind::Skipped => "skipped",
            VerdictKind::TransportFailure => "transport_failure",
        }
    }
}
