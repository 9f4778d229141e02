//! Wire-level data model for the GitHub REST surface we consume.
//!
//! Event payload types mirror the `pull_request` webhook shape; response
//! types keep only the fields the pipeline actually reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner/repository pair addressing every REST call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl From<&RepositoryInfo> for RepoRef {
    fn from(info: &RepositoryInfo) -> Self {
        Self {
            owner: info.owner.login.clone(),
            repo: info.name.clone(),
        }
    }
}

/// `pull_request` webhook event payload (subset of fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub repository: RepositoryInfo,
    pub pull_request: PullRequestInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub owner: UserRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelRef {
    pub name: String,
}

/// Branch pointer carried by the PR payload (`base` / `head`).
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: UserRef,
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub requested_reviewers: Vec<UserRef>,
    #[serde(default)]
    pub assignees: Vec<UserRef>,
    #[serde(default)]
    pub labels: Vec<LabelRef>,
    pub base: BranchRef,
    pub head: BranchRef,
}

/// One entry of `GET /pulls/{n}/files`. `patch` is absent for binary or
/// oversized diffs; the aggregator substitutes a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Issue or review comment as listed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentData {
    pub id: u64,
    #[serde(default)]
    pub user: Option<UserData>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub login: String,
}

/// Issue detail as returned by `GET /issues/{n}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueData {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub user: UserData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<LabelData>,
    #[serde(default)]
    pub assignees: Vec<UserData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelData {
    pub name: String,
}

/// Parameters of one inline review comment creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCommentParams {
    pub pull_number: u64,
    pub commit_id: String,
    pub path: String,
    pub body: String,
    pub line: u32,
}
