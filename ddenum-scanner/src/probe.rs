// Probe definitions: the static shape of one read-only permission check

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// HTTP method of a probe. Discovery is read-only, so GET is the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// Probe categories, declared in scan order.
///
/// Ordering follows increasing dependency on broader scopes, and `Ord`
/// follows declaration order so catalog ordering can be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Validation,
    Organization,
    Users,
    Keys,
    Infrastructure,
    Monitoring,
    LogsApm,
    Security,
    Integrations,
    Misc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Validation,
        Category::Organization,
        Category::Users,
        Category::Keys,
        Category::Infrastructure,
        Category::Monitoring,
        Category::LogsApm,
        Category::Security,
        Category::Integrations,
        Category::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Validation => "validation",
            Category::Organization => "organization",
            Category::Users => "users",
            Category::Keys => "keys",
            Category::Infrastructure => "infrastructure",
            Category::Monitoring => "monitoring",
            Category::LogsApm => "logs_apm",
            Category::Security => "security",
            Category::Integrations => "integrations",
            Category::Misc => "misc",
        }
    }

    /// Human readable section title
    pub fn title(&self) -> &'static str {
        match self {
            Category::Validation => "Key Validation",
            Category::Organization => "Organization",
            Category::Users => "Users & Roles",
            Category::Keys => "Keys",
            Category::Infrastructure => "Infrastructure",
            Category::Monitoring => "Monitoring",
            Category::LogsApm => "Logs / APM / RUM",
            Category::Security => "Security",
            Category::Integrations => "Integrations",
            Category::Misc => "Miscellaneous",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "validation" => Some(Category::Validation),
            "organization" | "org" => Some(Category::Organization),
            "users" => Some(Category::Users),
            "keys" => Some(Category::Keys),
            "infrastructure" | "infra" => Some(Category::Infrastructure),
            "monitoring" => Some(Category::Monitoring),
            "logs_apm" | "logs" | "apm" => Some(Category::LogsApm),
            "security" => Some(Category::Security),
            "integrations" => Some(Category::Integrations),
            "misc" => Some(Category::Misc),
            _ => None,
        }
    }
}

/// How to pull a summary out of a successful response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryHint {
    /// No summary, access alone is the finding
    None,
    Validation,
    Organization,
    Users,
    Roles,
    ApiKeys,
    Hosts,
    Metrics,
    Dashboards,
    Monitors,
    Events,
    SyntheticTests,
    /// Length of the top-level `data` array
    DataCount,
    /// Length of a top-level JSON array
    ArrayCount,
}

/// Relative time window some listing endpoints require as query parameters.
/// Resolved at dispatch time so catalog entries stay static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryWindow {
    /// `from=<now - 1h>`
    SinceLastHour,
    /// `start=<now - 24h>&end=<now>`
    LastDay,
}

impl QueryWindow {
    pub fn query_pairs(&self, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        match self {
            QueryWindow::SinceLastHour => {
                let from = now - Duration::hours(1);
                vec![("from", from.timestamp().to_string())]
            }
            QueryWindow::LastDay => {
                let start = now - Duration::hours(24);
                vec![
                    ("start", start.timestamp().to_string()),
                    ("end", now.timestamp().to_string()),
                ]
            }
        }
    }
}

/// One catalog-defined read-only API call used to test a specific permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub method: Method,
    pub requires_app_key: bool,
    pub category: Category,
    pub hint: SummaryHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<QueryWindow>,
}

impl ProbeDefinition {
    /// GET probe that requires an application key and has no summary
    pub const fn get(
        id: &'static str,
        label: &'static str,
        path: &'static str,
        category: Category,
    ) -> Self {
        Self {
            id,
            label,
            path,
            method: Method::Get,
            requires_app_key: true,
            category,
            hint: SummaryHint::None,
            window: None,
        }
    }

    pub const fn with_hint(mut self, hint: SummaryHint) -> Self {
        self.hint = hint;
        self
    }

    pub const fn with_window(mut self, window: QueryWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub const fn api_key_only(mut self) -> Self {
        self.requires_app_key = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_category_order_follows_declaration() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
        assert!(Category::Validation < Category::Misc);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(Category::from_str("Logs-APM"), Some(Category::LogsApm));
        assert_eq!(Category::from_str("infra"), Some(Category::Infrastructure));
        assert_eq!(Category::from_str("nope"), None);
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_query_window_pairs() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let pairs = QueryWindow::SinceLastHour.query_pairs(now);
        assert_eq!(pairs, vec![("from", (now.timestamp() - 3600).to_string())]);

        let pairs = QueryWindow::LastDay.query_pairs(now);
        assert_eq!(
            pairs,
            vec![
                ("start", (now.timestamp() - 86400).to_string()),
                ("end", now.timestamp().to_string()),
            ]
        );
    }

    #[test]
    fn test_probe_builders() {
        let probe = ProbeDefinition::get("validate", "Validate", "/api/v1/validate", Category::Validation)
            .api_key_only()
            .with_hint(SummaryHint::Validation);
        assert!(!probe.requires_app_key);
        assert_eq!(probe.hint, SummaryHint::Validation);
        assert_eq!(probe.method, Method::Get);
        assert!(probe.window.is_none());
    }
}
