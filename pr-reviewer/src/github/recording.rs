//! In-memory source-control client double.
//!
//! Serves canned responses, supports per-operation failure injection and
//! records every mutating call, so pipeline behavior can be asserted
//! without a network. Also usable as a dry-run backend: side effects land
//! in the call log instead of on the PR.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{PrResult, ProviderError};
use crate::github::types::*;

#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    inner: Arc<Mutex<RecordingState>>,
}

/// Canned responses, failure switches and the recorded side effects.
#[derive(Debug, Default)]
pub struct RecordingState {
    // canned responses
    pub files: Vec<PrFile>,
    pub issue_comments: Vec<CommentData>,
    pub review_comments: Vec<CommentData>,
    pub issues: HashMap<u64, IssueData>,
    /// Per-issue comment threads; falls back to `issue_comments` when absent.
    pub issue_threads: HashMap<u64, Vec<CommentData>>,
    pub readme: String,
    pub tree_paths: Vec<String>,
    pub file_contents: HashMap<String, String>,

    // failure injection
    pub fail_files: bool,
    pub fail_comments: bool,
    pub fail_repo_context: bool,
    pub fail_issue_fetch: HashSet<u64>,
    pub fail_review_comment_lines: HashSet<u32>,
    pub fail_issue_comment: bool,
    pub fail_remove_label: bool,
    /// When set, workflow dispatch fails with this HTTP status.
    pub workflow_status: Option<u16>,

    // recorded side effects
    pub created_issue_comments: Vec<(u64, String)>,
    pub created_review_comments: Vec<ReviewCommentParams>,
    pub added_labels: Vec<String>,
    pub removed_labels: Vec<String>,
    pub dispatched_workflows: Vec<(String, String)>,
}

impl RecordingClient {
    pub fn new(state: RecordingState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Locks the shared state for inspection or late mutation.
    pub fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.inner.lock().expect("recording state poisoned")
    }

    pub async fn list_pr_files(&self, _repo: &RepoRef, _number: u64) -> PrResult<Vec<PrFile>> {
        let st = self.state();
        if st.fail_files {
            return Err(ProviderError::Server(500).into());
        }
        Ok(st.files.clone())
    }

    pub async fn list_issue_comments(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> PrResult<Vec<CommentData>> {
        let st = self.state();
        if st.fail_comments {
            return Err(ProviderError::Forbidden.into());
        }
        Ok(st
            .issue_threads
            .get(&number)
            .cloned()
            .unwrap_or_else(|| st.issue_comments.clone()))
    }

    pub async fn list_review_comments(
        &self,
        _repo: &RepoRef,
        _number: u64,
    ) -> PrResult<Vec<CommentData>> {
        let st = self.state();
        if st.fail_comments {
            return Err(ProviderError::Forbidden.into());
        }
        Ok(st.review_comments.clone())
    }

    pub async fn get_issue(&self, _repo: &RepoRef, number: u64) -> PrResult<IssueData> {
        let st = self.state();
        if st.fail_issue_fetch.contains(&number) {
            return Err(ProviderError::NotFound.into());
        }
        st.issues
            .get(&number)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound.into())
    }

    pub async fn get_readme(&self, _repo: &RepoRef) -> PrResult<String> {
        let st = self.state();
        if st.fail_repo_context {
            return Err(ProviderError::Server(502).into());
        }
        Ok(st.readme.clone())
    }

    pub async fn get_tree_paths(&self, _repo: &RepoRef, _tree_sha: &str) -> PrResult<Vec<String>> {
        let st = self.state();
        if st.fail_repo_context {
            return Err(ProviderError::Server(502).into());
        }
        Ok(st.tree_paths.clone())
    }

    pub async fn get_file_content(
        &self,
        _repo: &RepoRef,
        path: &str,
        _git_ref: &str,
    ) -> PrResult<String> {
        let st = self.state();
        st.file_contents
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound.into())
    }

    pub async fn create_issue_comment(
        &self,
        _repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> PrResult<()> {
        let mut st = self.state();
        if st.fail_issue_comment {
            return Err(ProviderError::Forbidden.into());
        }
        st.created_issue_comments.push((number, body.to_string()));
        Ok(())
    }

    pub async fn create_review_comment(
        &self,
        _repo: &RepoRef,
        params: &ReviewCommentParams,
    ) -> PrResult<()> {
        let mut st = self.state();
        if st.fail_review_comment_lines.contains(&params.line) {
            return Err(ProviderError::Unprocessable.into());
        }
        st.created_review_comments.push(params.clone());
        Ok(())
    }

    pub async fn add_labels(
        &self,
        _repo: &RepoRef,
        _number: u64,
        labels: &[String],
    ) -> PrResult<()> {
        self.state().added_labels.extend(labels.iter().cloned());
        Ok(())
    }

    pub async fn remove_label(&self, _repo: &RepoRef, _number: u64, name: &str) -> PrResult<()> {
        let mut st = self.state();
        if st.fail_remove_label {
            return Err(ProviderError::NotFound.into());
        }
        st.removed_labels.push(name.to_string());
        Ok(())
    }

    pub async fn dispatch_workflow(
        &self,
        _repo: &RepoRef,
        workflow_id: &str,
        git_ref: &str,
    ) -> PrResult<()> {
        let mut st = self.state();
        if let Some(code) = st.workflow_status {
            return Err(ProviderError::from_status(code).into());
        }
        st.dispatched_workflows
            .push((workflow_id.to_string(), git_ref.to_string()));
        Ok(())
    }
}
