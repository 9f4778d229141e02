//! Thin client for the review model endpoint.
//!
//! The endpoint takes `{model, prompt, temperature}` and answers with
//! `{generated_text}`; anything else in the body is returned verbatim as
//! text so the orchestrator can still surface it.

use std::time::Duration;

use tracing::{debug, error};

use crate::errors::Error;

/// Model endpoint configuration, constructed once at startup and passed
/// by parameter into the pipeline (never an ambient singleton).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Named use case the deployment was configured for (logging only).
    pub use_case: String,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("LLM_API_ENDPOINT")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/generate".to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "codellama".to_string());
        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.7);
        let use_case = std::env::var("REVIEW_USE_CASE").unwrap_or_else(|_| "code-review".into());
        Self {
            endpoint,
            model,
            temperature,
            use_case,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    cfg: LlmConfig,
}

impl LlmClient {
    pub fn new(cfg: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .build()
            .expect("http client");
        Self { http, cfg }
    }

    /// Runs the analysis prompt and always returns text.
    ///
    /// Endpoint failures are folded into an `"Error analyzing PR: …"`
    /// message: downstream takes the parse-failed path and the error is
    /// surfaced on the PR instead of aborting the cycle.
    pub async fn analyze(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                error!(error = %err, "error calling LLM API");
                format!("Error analyzing PR: {err}")
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            model: &'a str,
            prompt: &'a str,
            temperature: f32,
        }

        debug!(
            model = %self.cfg.model,
            endpoint = %self.cfg.endpoint,
            use_case = %self.cfg.use_case,
            "llm.generate"
        );

        let resp = self
            .http
            .post(&self.cfg.endpoint)
            .json(&Req {
                model: &self.cfg.model,
                prompt,
                temperature: self.cfg.temperature,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Llm(format!(
                "endpoint returned status {}",
                resp.status().as_u16()
            )));
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(match body.get("generated_text").and_then(|v| v.as_str()) {
            Some(text) => text.to_string(),
            // No generated_text field: hand back the raw JSON body.
            None => body.to_string(),
        })
    }
}
