//! PR context aggregation (step 1 of the pipeline).
//!
//! Fans out to four independent data sources — changed files, comment
//! threads, repository context, linked issues — and fans back in once all
//! of them settle. Each source writes a disjoint snapshot field, so the
//! result is identical regardless of completion order.
//!
//! Partial-failure policy:
//! - files / comments: empty result + best-effort warning comment on the PR
//! - repository context: fixed placeholder strings
//! - linked issues: the whole bundle is dropped (`None`) and logged; the
//!   successfully fetched issues are discarded too, which is visible in
//!   the log line as `dropped=N`.

pub mod linked_issues;
pub mod types;

pub use types::*;

use tracing::{debug, error};

use crate::github::{PullRequestEvent, PullRequestInfo, RepoRef, SourceControlClient};
use crate::parser::{self, DIFF_UNAVAILABLE};

const README_PLACEHOLDER: &str = "Failed to fetch README";
const STRUCTURE_PLACEHOLDER: &str = "Failed to fetch repository structure";

/// Vendor directory excluded from the flattened tree listing.
const VENDOR_DIR: &str = "node_modules/";

/// Collects the full PR snapshot for one review cycle.
///
/// Never fails: every retrieval error is absorbed per the policy above.
pub async fn collect_pr_snapshot(
    client: &SourceControlClient,
    event: &PullRequestEvent,
) -> PrSnapshot {
    let repo = RepoRef::from(&event.repository);
    let pr = &event.pull_request;

    // References come from the body when present, the title otherwise.
    let reference_text = pr
        .body
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(&pr.title);
    let issue_numbers = linked_issues::extract_issue_numbers(reference_text);

    debug!(
        pr = pr.number,
        issue_refs = issue_numbers.len(),
        "step1: fan out to data sources"
    );

    let (files, comments, repository, linked) = tokio::join!(
        fetch_changed_files(client, &repo, pr.number),
        fetch_pr_comments(client, &repo, pr.number),
        fetch_repository_context(client, &repo),
        async {
            if issue_numbers.is_empty() {
                None
            } else {
                Some(linked_issues::fetch_linked_issues(client, &repo, &issue_numbers).await)
            }
        }
    );

    let linked_issues = match linked {
        Some(Ok(bundle)) => Some(bundle),
        Some(Err(err)) => {
            // All-or-nothing: issues that did fetch successfully are
            // discarded along with the failing one.
            error!(
                error = %err,
                dropped = issue_numbers.len(),
                "failed to get linked issue data; discarding linked issues for this cycle"
            );
            None
        }
        None => None,
    };

    let code_changes = build_code_changes(&files);

    PrSnapshot {
        metadata: pr_metadata(pr),
        comments,
        relationships: PrRelationships {
            requested_reviewers: pr.requested_reviewers.iter().map(|u| u.login.clone()).collect(),
            assignees: pr.assignees.iter().map(|u| u.login.clone()).collect(),
            labels: pr.labels.iter().map(|l| l.name.clone()).collect(),
        },
        code_changes,
        files,
        linked_issues,
        repository,
    }
}

fn pr_metadata(pr: &PullRequestInfo) -> PrMetadata {
    PrMetadata {
        title: pr.title.clone(),
        body: pr.body.clone(),
        author: pr.user.login.clone(),
        state: pr.state.clone(),
        draft: pr.draft,
        created_at: pr.created_at,
        updated_at: pr.updated_at,
        mergeable: pr.mergeable,
        additions: pr.additions,
        deletions: pr.deletions,
        changed_files: pr.changed_files,
        base: BranchInfo {
            branch: pr.base.git_ref.clone(),
            sha: pr.base.sha.clone(),
        },
        head: BranchInfo {
            branch: pr.head.git_ref.clone(),
            sha: pr.head.sha.clone(),
        },
    }
}

/// Changed files with per-file patch text; a missing patch becomes the
/// "diff too large" sentinel. Failure yields an empty list plus a warning
/// comment to the PR author.
async fn fetch_changed_files(
    client: &SourceControlClient,
    repo: &RepoRef,
    number: u64,
) -> Vec<ChangedFile> {
    match client.list_pr_files(repo, number).await {
        Ok(files) => files
            .into_iter()
            .map(|f| ChangedFile {
                filename: f.filename,
                status: f.status,
                additions: f.additions,
                deletions: f.deletions,
                changes: f.changes,
                patch: f.patch.unwrap_or_else(|| DIFF_UNAVAILABLE.to_string()),
            })
            .collect(),
        Err(err) => {
            error!(error = %err, "error fetching PR files");
            warn_on_pr(client, repo, number, &format!("⚠️ Failed to fetch PR files: {err}")).await;
            Vec::new()
        }
    }
}

/// Issue-level and review-level comment threads, fetched concurrently.
/// Any failure empties both lists plus a warning comment.
async fn fetch_pr_comments(
    client: &SourceControlClient,
    repo: &RepoRef,
    number: u64,
) -> PrComments {
    let (issue, review) = tokio::join!(
        client.list_issue_comments(repo, number),
        client.list_review_comments(repo, number)
    );

    match (issue, review) {
        (Ok(issue), Ok(review)) => PrComments {
            issue_comments: issue.into_iter().map(comment_info).collect(),
            review_comments: review.into_iter().map(comment_info).collect(),
        },
        (Err(err), _) | (_, Err(err)) => {
            error!(error = %err, "error fetching PR comments");
            warn_on_pr(client, repo, number, &format!("⚠️ Failed to fetch PR comments: {err}"))
                .await;
            PrComments::default()
        }
    }
}

fn comment_info(c: crate::github::CommentData) -> CommentInfo {
    CommentInfo {
        id: c.id,
        user: c.user.map(|u| u.login).unwrap_or_else(|| "unknown".into()),
        body: c.body.unwrap_or_default(),
        created_at: c.created_at,
        updated_at: c.updated_at,
        url: c.html_url,
    }
}

/// README plus the recursive tree flattened to one path per line,
/// excluding vendored dependencies. Failure yields fixed placeholders.
async fn fetch_repository_context(
    client: &SourceControlClient,
    repo: &RepoRef,
) -> RepositoryContext {
    let (readme, tree) = tokio::join!(
        client.get_readme(repo),
        client.get_tree_paths(repo, "HEAD")
    );

    match (readme, tree) {
        (Ok(readme), Ok(paths)) => {
            let structure = paths
                .into_iter()
                .filter(|p| !p.contains(VENDOR_DIR))
                .collect::<Vec<_>>()
                .join("\n");
            RepositoryContext {
                readme,
                structure,
                name: repo.repo.clone(),
                owner: repo.owner.clone(),
            }
        }
        (readme, tree) => {
            if let Err(err) = readme.as_ref() {
                error!(error = %err, "error fetching repository README");
            }
            if let Err(err) = tree.as_ref() {
                error!(error = %err, "error fetching repository tree");
            }
            RepositoryContext {
                readme: README_PLACEHOLDER.to_string(),
                structure: STRUCTURE_PLACEHOLDER.to_string(),
                name: repo.repo.clone(),
                owner: repo.owner.clone(),
            }
        }
    }
}

/// Digest of per-file added/removed lines for the prompt.
fn build_code_changes(files: &[ChangedFile]) -> CodeChanges {
    let changes: Vec<CodeChange> = files
        .iter()
        .map(|f| {
            let lines = parser::parse_patch(Some(&f.patch));
            CodeChange {
                file: f.filename.clone(),
                change_type: f.status.clone(),
                changes: LineChanges {
                    removed: lines.removed.join("\n"),
                    added: lines.added.join("\n"),
                },
                stats: ChangeStats {
                    additions: f.additions,
                    deletions: f.deletions,
                },
            }
        })
        .collect();

    CodeChanges {
        summary: ChangeSummary {
            files_changed: changes.len(),
            total_additions: files.iter().map(|f| f.additions).sum(),
            total_deletions: files.iter().map(|f| f.deletions).sum(),
        },
        changes,
    }
}

/// Best-effort warning comment; its own failure is only logged to avoid
/// error-comment loops.
async fn warn_on_pr(client: &SourceControlClient, repo: &RepoRef, number: u64, body: &str) {
    if let Err(err) = client.create_issue_comment(repo, number, body).await {
        error!(error = %err, "failed to post warning comment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::recording::RecordingState;
    use crate::github::{PrFile, SourceControlClient};
    use crate::test_support::pr_event;

    fn file(name: &str, patch: Option<&str>, add: u64, del: u64) -> PrFile {
        PrFile {
            filename: name.to_string(),
            status: "modified".to_string(),
            additions: add,
            deletions: del,
            changes: add + del,
            patch: patch.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn snapshot_assembles_all_sources() {
        let state = RecordingState {
            files: vec![file("src/a.rs", Some("@@ -1,1 +1,2 @@\n line\n+added"), 1, 0)],
            readme: "# Demo".to_string(),
            tree_paths: vec![
                "src/a.rs".to_string(),
                "node_modules/x/index.js".to_string(),
                "README.md".to_string(),
            ],
            ..Default::default()
        };
        let client = SourceControlClient::recording(state);
        let event = pr_event("adds feature", Some("plain body, no refs"));

        let snapshot = collect_pr_snapshot(&client, &event).await;

        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.code_changes.summary.files_changed, 1);
        assert_eq!(snapshot.code_changes.changes[0].changes.added, "added");
        assert_eq!(snapshot.repository.readme, "# Demo");
        // vendored entries are excluded from the structure listing
        assert_eq!(snapshot.repository.structure, "src/a.rs\nREADME.md");
        assert!(snapshot.linked_issues.is_none());
    }

    #[tokio::test]
    async fn comment_failure_keeps_files_and_repository() {
        let state = RecordingState {
            files: vec![file("src/a.rs", None, 0, 0)],
            readme: "readme".to_string(),
            fail_comments: true,
            ..Default::default()
        };
        let client = SourceControlClient::recording(state);
        let event = pr_event("t", None);

        let snapshot = collect_pr_snapshot(&client, &event).await;

        assert_eq!(snapshot.files.len(), 1);
        // missing patch is replaced by the sentinel
        assert_eq!(snapshot.files[0].patch, DIFF_UNAVAILABLE);
        assert_eq!(snapshot.repository.readme, "readme");
        assert!(snapshot.comments.issue_comments.is_empty());
        assert!(snapshot.comments.review_comments.is_empty());

        // a warning comment was attempted on the PR
        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert_eq!(st.created_issue_comments.len(), 1);
            assert!(st.created_issue_comments[0].1.contains("Failed to fetch PR comments"));
        }
    }

    #[tokio::test]
    async fn file_failure_empties_list_and_warns() {
        let state = RecordingState {
            readme: "readme".to_string(),
            fail_files: true,
            ..Default::default()
        };
        let client = SourceControlClient::recording(state);
        let event = pr_event("t", None);

        let snapshot = collect_pr_snapshot(&client, &event).await;

        assert!(snapshot.files.is_empty());
        assert_eq!(snapshot.code_changes.summary.files_changed, 0);
        // the other sources are untouched
        assert_eq!(snapshot.repository.readme, "readme");

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert_eq!(st.created_issue_comments.len(), 1);
            assert!(st.created_issue_comments[0].1.contains("Failed to fetch PR files"));
        }
    }

    #[tokio::test]
    async fn repo_context_failure_uses_placeholders() {
        let state = RecordingState {
            fail_repo_context: true,
            ..Default::default()
        };
        let client = SourceControlClient::recording(state);
        let snapshot = collect_pr_snapshot(&client, &pr_event("t", None)).await;

        assert_eq!(snapshot.repository.readme, README_PLACEHOLDER);
        assert_eq!(snapshot.repository.structure, STRUCTURE_PLACEHOLDER);
        assert_eq!(snapshot.repository.owner, "octocat");
    }

    #[tokio::test]
    async fn linked_issue_failure_drops_whole_bundle() {
        let mut state = RecordingState::default();
        state.issues.insert(1, crate::test_support::issue(1, "first"));
        // issue #2 is referenced but missing -> NotFound
        let client = SourceControlClient::recording(state);
        let event = pr_event("t", Some("fixes #1 and #2"));

        let snapshot = collect_pr_snapshot(&client, &event).await;
        assert!(snapshot.linked_issues.is_none());
    }

    #[tokio::test]
    async fn linked_issues_resolved_when_all_succeed() {
        let mut state = RecordingState::default();
        state.issues.insert(7, crate::test_support::issue(7, "bug"));
        let client = SourceControlClient::recording(state);
        let event = pr_event("t", Some("closes #7"));

        let snapshot = collect_pr_snapshot(&client, &event).await;
        let bundle = snapshot.linked_issues.expect("bundle present");
        assert_eq!(bundle.issues_count, 1);
        assert_eq!(bundle.issues[0].title, "bug");
    }
}
