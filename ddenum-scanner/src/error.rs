use thiserror::Error;

/// Fatal setup errors. Raised before any request leaves the machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("API key is required (pass it as an argument or set DD_API_KEY)")]
    EmptyApiKey,

    #[error("Unknown region '{0}' (expected one of: us1, us3, us5, eu, ap1)")]
    UnknownRegion(String),

    #[error("Invalid API endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
