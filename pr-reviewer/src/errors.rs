//! Crate-wide error hierarchy for pr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Provider-aware mapping (401→Unauthorized, 404→NotFound, 422→Unprocessable, etc.).
//! - Explicit status-code case analysis instead of probing response shapes.
//! - No dynamic dispatch, no async-trait, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type PrResult<T> = Result<T, Error>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Source-control host (GitHub REST) related failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// CI workflow dispatch failure, kept separate because only some
    /// status codes are swallowed after reporting (404/403/422).
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Configuration problems (missing tokens, bad endpoints, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// LLM endpoint failure (transport or non-2xx status).
    #[error("llm error: {0}")]
    Llm(String),

    /// Generic catch-all error when nothing else fits.
    #[error("other error: {0}")]
    Other(String),
}

impl Error {
    /// HTTP status carried by the underlying failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Provider(p) => p.status_code(),
            Error::Workflow(w) => w.status,
            _ => None,
        }
    }
}

/// Detailed provider-specific error used inside the GitHub client layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Unprocessable entity (HTTP 422), e.g. an invalid review position.
    #[error("unprocessable entity")]
    Unprocessable,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// JSON deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Numeric HTTP status for explicit case analysis (404/403/422/other).
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Unauthorized => Some(401),
            ProviderError::Forbidden => Some(403),
            ProviderError::NotFound => Some(404),
            ProviderError::Unprocessable => Some(422),
            ProviderError::RateLimited => Some(429),
            ProviderError::Server(code) | ProviderError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// Maps a raw HTTP status into the matching variant.
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden,
            404 => ProviderError::NotFound,
            422 => ProviderError::Unprocessable,
            429 => ProviderError::RateLimited,
            500..=599 => ProviderError::Server(code),
            _ => ProviderError::HttpStatus(code),
        }
    }
}

/// Workflow dispatch failure with the status that caused it.
#[derive(Debug, Error)]
#[error("workflow '{workflow_id}' dispatch failed: {message}")]
pub struct WorkflowError {
    pub workflow_id: String,
    pub message: String,
    pub status: Option<u16>,
}

/// Configuration and setup errors (API endpoints, missing token, etc.).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing github token")]
    MissingToken,

    #[error("invalid api endpoint: {0}")]
    InvalidEndpoint(String),
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Provider(ProviderError::Serde(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            return ProviderError::from_status(status.as_u16());
        }
        ProviderError::Network(e.to_string())
    }
}
