//! GitHub REST v3 client.
//!
//! Endpoints used:
//! - GET  /repos/{owner}/{repo}/pulls/{number}/files            (paginated)
//! - GET  /repos/{owner}/{repo}/issues/{number}/comments        (paginated)
//! - GET  /repos/{owner}/{repo}/pulls/{number}/comments         (paginated)
//! - GET  /repos/{owner}/{repo}/issues/{number}
//! - GET  /repos/{owner}/{repo}/readme
//! - GET  /repos/{owner}/{repo}/git/trees/{sha}?recursive=1
//! - GET  /repos/{owner}/{repo}/contents/{path}?ref={ref}
//! - POST /repos/{owner}/{repo}/issues/{number}/comments
//! - POST /repos/{owner}/{repo}/pulls/{number}/comments
//! - POST /repos/{owner}/{repo}/issues/{number}/labels
//! - DELETE /repos/{owner}/{repo}/issues/{number}/labels/{name}
//! - POST /repos/{owner}/{repo}/actions/workflows/{id}/dispatches

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{PrResult, ProviderError};
use crate::github::types::*;

const PER_PAGE: usize = 100;

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // e.g. "https://api.github.com"
    token: String,
}

impl GitHubClient {
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, repo: &RepoRef, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_api, repo.owner, repo.repo, tail
        )
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    /// GET a single JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> PrResult<T> {
        debug!(%url, "github GET");
        let resp = self
            .authed(self.http.get(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// GET every page of a list endpoint (per_page=100 until a short page).
    async fn get_paginated<T: DeserializeOwned>(&self, url: &str) -> PrResult<Vec<T>> {
        let mut out = Vec::new();
        let mut page = 1u32;
        loop {
            debug!(%url, page, "github GET (paginated)");
            let batch: Vec<T> = self
                .authed(self.http.get(url))
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let len = batch.len();
            out.extend(batch);
            if len < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(out)
    }

    pub async fn list_pr_files(&self, repo: &RepoRef, number: u64) -> PrResult<Vec<PrFile>> {
        self.get_paginated(&self.url(repo, &format!("pulls/{number}/files")))
            .await
    }

    pub async fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> PrResult<Vec<CommentData>> {
        self.get_paginated(&self.url(repo, &format!("issues/{number}/comments")))
            .await
    }

    pub async fn list_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> PrResult<Vec<CommentData>> {
        self.get_paginated(&self.url(repo, &format!("pulls/{number}/comments")))
            .await
    }

    pub async fn get_issue(&self, repo: &RepoRef, number: u64) -> PrResult<IssueData> {
        self.get_json(&self.url(repo, &format!("issues/{number}")))
            .await
    }

    /// Fetches the repository README, decoded to UTF-8 text.
    pub async fn get_readme(&self, repo: &RepoRef) -> PrResult<String> {
        let doc: ContentDoc = self.get_json(&self.url(repo, "readme")).await?;
        decode_content(&doc)
    }

    /// Fetches the recursive file tree at a ref and returns the flat paths.
    pub async fn get_tree_paths(&self, repo: &RepoRef, tree_sha: &str) -> PrResult<Vec<String>> {
        let url = format!("{}?recursive=1", self.url(repo, &format!("git/trees/{tree_sha}")));
        let doc: TreeDoc = self.get_json(&url).await?;
        Ok(doc.tree.into_iter().map(|e| e.path).collect())
    }

    /// Fetches a repository file's decoded content at a specific ref.
    pub async fn get_file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> PrResult<String> {
        let url = format!("{}?ref={git_ref}", self.url(repo, &format!("contents/{path}")));
        let doc: ContentDoc = self.get_json(&url).await?;
        decode_content(&doc)
    }

    pub async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> PrResult<()> {
        let url = self.url(repo, &format!("issues/{number}/comments"));
        debug!(%url, "github POST issue comment");
        self.authed(self.http.post(&url))
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn create_review_comment(
        &self,
        repo: &RepoRef,
        params: &ReviewCommentParams,
    ) -> PrResult<()> {
        let url = self.url(repo, &format!("pulls/{}/comments", params.pull_number));
        debug!(%url, path = %params.path, line = params.line, "github POST review comment");
        self.authed(self.http.post(&url))
            .json(&serde_json::json!({
                "commit_id": params.commit_id,
                "path": params.path,
                "body": params.body,
                "line": params.line,
                "side": "RIGHT",
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn add_labels(&self, repo: &RepoRef, number: u64, labels: &[String]) -> PrResult<()> {
        let url = self.url(repo, &format!("issues/{number}/labels"));
        self.authed(self.http.post(&url))
            .json(&serde_json::json!({ "labels": labels }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn remove_label(&self, repo: &RepoRef, number: u64, name: &str) -> PrResult<()> {
        let url = self.url(repo, &format!("issues/{number}/labels/{name}"));
        self.authed(self.http.delete(&url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Creates a `workflow_dispatch` event for a named workflow file.
    pub async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        git_ref: &str,
    ) -> PrResult<()> {
        let url = self.url(repo, &format!("actions/workflows/{workflow_id}/dispatches"));
        debug!(%url, git_ref, "github POST workflow dispatch");
        self.authed(self.http.post(&url))
            .json(&serde_json::json!({ "ref": git_ref }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// --- GitHub response shapes local to this client ---

#[derive(Debug, Deserialize)]
struct ContentDoc {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeDoc {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
}

/// Contents API returns base64 with embedded newlines.
fn decode_content(doc: &ContentDoc) -> PrResult<String> {
    if doc.encoding.as_deref() == Some("none") {
        return Ok(doc.content.clone());
    }
    let compact: String = doc.content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad base64 content: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ProviderError::InvalidResponse(format!("content is not utf-8: {e}")).into())
}
