//! Shared fixtures for the crate's tests.

use chrono::Utc;

use crate::context::{
    ChangeSummary, CodeChanges, PrComments, PrMetadata, PrRelationships, PrSnapshot,
    RepositoryContext,
};
use crate::context::BranchInfo;
use crate::github::{
    BranchRef, IssueData, PullRequestEvent, PullRequestInfo, RepoRef, RepositoryInfo, UserData,
    UserRef,
};

pub(crate) fn repo_ref() -> RepoRef {
    RepoRef {
        owner: "octocat".to_string(),
        repo: "demo".to_string(),
    }
}

/// Minimal `pull_request` event: repo "octocat/demo", PR #42,
/// head "feature"@"headsha" onto "main"@"basesha".
pub(crate) fn pr_event(title: &str, body: Option<&str>) -> PullRequestEvent {
    let now = Utc::now();
    PullRequestEvent {
        action: "opened".to_string(),
        repository: RepositoryInfo {
            name: "demo".to_string(),
            owner: UserRef {
                login: "octocat".to_string(),
            },
        },
        pull_request: PullRequestInfo {
            number: 42,
            title: title.to_string(),
            body: body.map(str::to_string),
            user: UserRef {
                login: "contributor".to_string(),
            },
            state: "open".to_string(),
            draft: false,
            created_at: now,
            updated_at: now,
            mergeable: Some(true),
            additions: 0,
            deletions: 0,
            changed_files: 0,
            requested_reviewers: Vec::new(),
            assignees: Vec::new(),
            labels: Vec::new(),
            base: BranchRef {
                git_ref: "main".to_string(),
                sha: "basesha".to_string(),
            },
            head: BranchRef {
                git_ref: "feature".to_string(),
                sha: "headsha".to_string(),
            },
        },
    }
}

pub(crate) fn issue(number: u64, title: &str) -> IssueData {
    let now = Utc::now();
    IssueData {
        number,
        title: title.to_string(),
        body: Some("issue body".to_string()),
        state: "open".to_string(),
        user: UserData {
            login: "reporter".to_string(),
        },
        created_at: now,
        updated_at: now,
        labels: Vec::new(),
        assignees: Vec::new(),
    }
}

/// Snapshot with a populated repository context and no linked issues.
pub(crate) fn snapshot_with_defaults() -> PrSnapshot {
    let now = Utc::now();
    PrSnapshot {
        metadata: PrMetadata {
            title: "adds feature".to_string(),
            body: None,
            author: "contributor".to_string(),
            state: "open".to_string(),
            draft: false,
            created_at: now,
            updated_at: now,
            mergeable: Some(true),
            additions: 1,
            deletions: 0,
            changed_files: 1,
            base: BranchInfo {
                branch: "main".to_string(),
                sha: "basesha".to_string(),
            },
            head: BranchInfo {
                branch: "feature".to_string(),
                sha: "headsha".to_string(),
            },
        },
        comments: PrComments::default(),
        files: Vec::new(),
        relationships: PrRelationships {
            requested_reviewers: Vec::new(),
            assignees: Vec::new(),
            labels: Vec::new(),
        },
        code_changes: CodeChanges {
            summary: ChangeSummary {
                files_changed: 0,
                total_additions: 0,
                total_deletions: 0,
            },
            changes: Vec::new(),
        },
        linked_issues: None,
        repository: RepositoryContext {
            readme: "# Demo\nA demo project.".to_string(),
            structure: "src/main.rs\nsrc/lib.rs\nREADME.md".to_string(),
            name: "demo".to_string(),
            owner: "octocat".to_string(),
        },
    }
}
