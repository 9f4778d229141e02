//! Source-control client facade w/o async-trait or dynamic trait objects.
//!
//! `SourceControlClient` is an enum over the real REST client and the
//! in-memory recording double. This keeps async fns simple, avoids boxed
//! futures, and gives tests a drop-in client that records calls instead
//! of hitting the network.

pub mod recording;
pub mod rest;
pub mod types;

pub use types::*;

use crate::errors::{ConfigError, PrResult};

/// Runtime configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or app installation token).
    pub token: String,
}

impl GithubConfig {
    /// Reads `GITHUB_API_BASE` (optional) and `GITHUB_TOKEN` (required).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_api = std::env::var("GITHUB_API_BASE")
            .unwrap_or_else(|_| "https://api.github.com".to_string());
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        Ok(Self { base_api, token })
    }
}

/// Concrete client (enum-dispatch).
#[derive(Debug, Clone)]
pub enum SourceControlClient {
    GitHub(rest::GitHubClient),
    Recording(recording::RecordingClient),
}

impl SourceControlClient {
    /// Constructs the REST client from config with a shared reqwest instance.
    pub fn from_config(cfg: GithubConfig) -> PrResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("pr-reviewer/0.1")
            .build()?;
        Ok(Self::GitHub(rest::GitHubClient::new(
            http,
            cfg.base_api,
            cfg.token,
        )))
    }

    /// Recording double preloaded with the given state.
    pub fn recording(state: recording::RecordingState) -> Self {
        Self::Recording(recording::RecordingClient::new(state))
    }

    pub async fn list_pr_files(&self, repo: &RepoRef, number: u64) -> PrResult<Vec<PrFile>> {
        match self {
            Self::GitHub(c) => c.list_pr_files(repo, number).await,
            Self::Recording(c) => c.list_pr_files(repo, number).await,
        }
    }

    pub async fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> PrResult<Vec<CommentData>> {
        match self {
            Self::GitHub(c) => c.list_issue_comments(repo, number).await,
            Self::Recording(c) => c.list_issue_comments(repo, number).await,
        }
    }

    pub async fn list_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> PrResult<Vec<CommentData>> {
        match self {
            Self::GitHub(c) => c.list_review_comments(repo, number).await,
            Self::Recording(c) => c.list_review_comments(repo, number).await,
        }
    }

    pub async fn get_issue(&self, repo: &RepoRef, number: u64) -> PrResult<IssueData> {
        match self {
            Self::GitHub(c) => c.get_issue(repo, number).await,
            Self::Recording(c) => c.get_issue(repo, number).await,
        }
    }

    pub async fn get_readme(&self, repo: &RepoRef) -> PrResult<String> {
        match self {
            Self::GitHub(c) => c.get_readme(repo).await,
            Self::Recording(c) => c.get_readme(repo).await,
        }
    }

    pub async fn get_tree_paths(&self, repo: &RepoRef, tree_sha: &str) -> PrResult<Vec<String>> {
        match self {
            Self::GitHub(c) => c.get_tree_paths(repo, tree_sha).await,
            Self::Recording(c) => c.get_tree_paths(repo, tree_sha).await,
        }
    }

    pub async fn get_file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> PrResult<String> {
        match self {
            Self::GitHub(c) => c.get_file_content(repo, path, git_ref).await,
            Self::Recording(c) => c.get_file_content(repo, path, git_ref).await,
        }
    }

    pub async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> PrResult<()> {
        match self {
            Self::GitHub(c) => c.create_issue_comment(repo, number, body).await,
            Self::Recording(c) => c.create_issue_comment(repo, number, body).await,
        }
    }

    pub async fn create_review_comment(
        &self,
        repo: &RepoRef,
        params: &ReviewCommentParams,
    ) -> PrResult<()> {
        match self {
            Self::GitHub(c) => c.create_review_comment(repo, params).await,
            Self::Recording(c) => c.create_review_comment(repo, params).await,
        }
    }

    pub async fn add_labels(&self, repo: &RepoRef, number: u64, labels: &[String]) -> PrResult<()> {
        match self {
            Self::GitHub(c) => c.add_labels(repo, number, labels).await,
            Self::Recording(c) => c.add_labels(repo, number, labels).await,
        }
    }

    pub async fn remove_label(&self, repo: &RepoRef, number: u64, name: &str) -> PrResult<()> {
        match self {
            Self::GitHub(c) => c.remove_label(repo, number, name).await,
            Self::Recording(c) => c.remove_label(repo, number, name).await,
        }
    }

    pub async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        git_ref: &str,
    ) -> PrResult<()> {
        match self {
            Self::GitHub(c) => c.dispatch_workflow(repo, workflow_id, git_ref).await,
            Self::Recording(c) => c.dispatch_workflow(repo, workflow_id, git_ref).await,
        }
    }
}
