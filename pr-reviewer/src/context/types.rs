//! Aggregated PR snapshot consumed by prompt building.
//!
//! Built once per review cycle, immutable after construction, never cached
//! across cycles. Every field is filled by an independent data source, so
//! partial failure of one source leaves the others intact.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The full per-cycle snapshot handed to the model-prompting step.
#[derive(Debug, Clone, Serialize)]
pub struct PrSnapshot {
    pub metadata: PrMetadata,
    pub comments: PrComments,
    pub files: Vec<ChangedFile>,
    pub relationships: PrRelationships,
    pub code_changes: CodeChanges,
    /// `None` when no issue references were found *or* when linked-issue
    /// retrieval failed (the failure is logged, not represented here).
    pub linked_issues: Option<LinkedIssueBundle>,
    pub repository: RepositoryContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrMetadata {
    pub title: String,
    pub body: Option<String>,
    pub author: String,
    pub state: String,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub mergeable: Option<bool>,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub base: BranchInfo,
    pub head: BranchInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchInfo {
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrComments {
    pub issue_comments: Vec<CommentInfo>,
    pub review_comments: Vec<CommentInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentInfo {
    pub id: u64,
    pub user: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

/// One changed file with its raw patch (or the "too large" sentinel).
#[derive(Debug, Clone, Serialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub patch: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrRelationships {
    pub requested_reviewers: Vec<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
}

/// Code-change digest derived from the per-file patches.
#[derive(Debug, Clone, Serialize)]
pub struct CodeChanges {
    pub summary: ChangeSummary,
    pub changes: Vec<CodeChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeSummary {
    pub files_changed: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeChange {
    pub file: String,
    #[serde(rename = "type")]
    pub change_type: String,
    pub changes: LineChanges,
    pub stats: ChangeStats,
}

/// Added/removed lines joined into newline-separated blocks.
#[derive(Debug, Clone, Serialize)]
pub struct LineChanges {
    pub removed: String,
    pub added: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeStats {
    pub additions: u64,
    pub deletions: u64,
}

/// Linked issues referenced from the PR title/body.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedIssueBundle {
    pub issues: Vec<LinkedIssue>,
    pub issues_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub comments: Vec<IssueCommentInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueCommentInfo {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Repository-level context (README + flattened tree).
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryContext {
    pub readme: String,
    pub structure: String,
    pub name: String,
    pub owner: String,
}
