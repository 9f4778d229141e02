use pr_reviewer::errors::Error;
use pr_reviewer::github::{GithubConfig, SourceControlClient};
use pr_reviewer::review::llm::{LlmClient, LlmConfig};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared secret to protect the webhook endpoint from random callers.
    pub webhook_secret: String,
    /// Source-control client, constructed once and reused across deliveries.
    pub client: SourceControlClient,
    /// Review model client.
    pub llm: LlmClient,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let github = GithubConfig::from_env()?;
        Ok(Self {
            webhook_secret: std::env::var("WEBHOOK_SECRET").unwrap_or_default(),
            client: SourceControlClient::from_config(github)?,
            llm: LlmClient::new(LlmConfig::from_env()),
        })
    }
}
