use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Datadog data residency zones and their API hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us1,
    Us3,
    Us5,
    Eu,
    Ap1,
}

impl Region {
    pub const ALL: [Region; 5] = [Region::Us1, Region::Us3, Region::Us5, Region::Eu, Region::Ap1];

    pub fn code(&self) -> &'static str {
        match self {
            Region::Us1 => "us1",
            Region::Us3 => "us3",
            Region::Us5 => "us5",
            Region::Eu => "eu",
            Region::Ap1 => "ap1",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Us1 => "https://api.datadoghq.com",
            Region::Us3 => "https://api.us3.datadoghq.com",
            Region::Us5 => "https://api.us5.datadoghq.com",
            Region::Eu => "https://api.datadoghq.eu",
            Region::Ap1 => "https://api.ap1.datadoghq.com",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ConfigurationError> {
        let normalized = code.trim().to_lowercase();
        Region::ALL
            .into_iter()
            .find(|region| region.code() == normalized)
            .ok_or_else(|| ConfigurationError::UnknownRegion(code.to_string()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolve a region code to its API base URL. Pure lookup, no network.
pub fn resolve(region: &str) -> Result<&'static str, ConfigurationError> {
    Region::from_code(region).map(|r| r.base_url())
}

/// Which credentials were supplied for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    ApiKeyOnly,
    ApiAndApplicationKey,
}

impl CredentialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialMode::ApiKeyOnly => "api_key_only",
            CredentialMode::ApiAndApplicationKey => "api_and_application_key",
        }
    }
}

/// Resolved credentials and target endpoint for one run.
///
/// Built once, then only read. Keys are not reachable through `Debug` or
/// serialization; use [`CredentialContext::masked_api_key`] for display.
#[derive(Clone)]
pub struct CredentialContext {
    api_key: String,
    app_key: Option<String>,
    region: Option<Region>,
    base_url: Url,
}

impl CredentialContext {
    /// Build a context for one of the supported regions.
    pub fn build(
        api_key: &str,
        app_key: Option<&str>,
        region: &str,
    ) -> Result<Self, ConfigurationError> {
        let api_key = normalize_api_key(api_key)?;
        let region = Region::from_code(region)?;
        let base_url = Url::parse(region.base_url())
            .map_err(|e| ConfigurationError::InvalidEndpoint(region.base_url().to_string(), e.to_string()))?;

        Ok(Self {
            api_key,
            app_key: normalize_app_key(app_key),
            region: Some(region),
            base_url,
        })
    }

    /// Build a context against an explicit API endpoint instead of a region.
    pub fn with_base_url(
        api_key: &str,
        app_key: Option<&str>,
        base_url: &str,
    ) -> Result<Self, ConfigurationError> {
        let api_key = normalize_api_key(api_key)?;
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| ConfigurationError::InvalidEndpoint(base_url.to_string(), e.to_string()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigurationError::InvalidEndpoint(
                base_url.to_string(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigurationError::InvalidEndpoint(
                base_url.to_string(),
                "missing host".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            app_key: normalize_app_key(app_key),
            region: None,
            base_url: parsed,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn app_key(&self) -> Option<&str> {
        self.app_key.as_deref()
    }

    pub fn has_app_key(&self) -> bool {
        self.app_key.is_some()
    }

    /// `None` when the context targets a custom endpoint
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// Region code, or "custom" for an explicit endpoint
    pub fn region_label(&self) -> &'static str {
        self.region.map(|r| r.code()).unwrap_or("custom")
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credential_mode(&self) -> CredentialMode {
        if self.app_key.is_some() {
            CredentialMode::ApiAndApplicationKey
        } else {
            CredentialMode::ApiKeyOnly
        }
    }

    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("api_key", &mask_secret(&self.api_key))
            .field("app_key", &self.app_key.as_ref().map(|k| mask_secret(k)))
            .field("region", &self.region)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Show only the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

fn normalize_api_key(api_key: &str) -> Result<String, ConfigurationError> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::EmptyApiKey);
    }
    Ok(trimmed.to_string())
}

fn normalize_app_key(app_key: Option<&str>) -> Option<String> {
    app_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
}
