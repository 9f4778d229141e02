//! Inline review comment placement (step 3b).
//!
//! Walks the interpreted diff and creates one review comment per added
//! line, anchored at `(path, new-file line)` on the PR head commit.
//! Deleted files are skipped. Placement is sequential with no batching,
//! concurrency cap or backoff — on very large diffs this can run into
//! provider rate limits; failures are isolated per comment and logged,
//! never retried, and never abort the remaining placements.

use tracing::{error, info};

use crate::github::{PullRequestEvent, RepoRef, ReviewCommentParams, SourceControlClient};
use crate::parser::{self, DiffChange};

/// Places one inline comment per added line of `diff`.
pub async fn place_inline_comments(
    client: &SourceControlClient,
    event: &PullRequestEvent,
    diff: &str,
) {
    let files = parser::parse_unified_diff(diff);
    let repo = RepoRef::from(&event.repository);
    let pr = &event.pull_request;

    for file in &files {
        if file.is_deleted() {
            info!(path = ?file.source_path, "skipping deleted file");
            continue;
        }
        let Some(path) = file.comment_path() else {
            continue;
        };

        for hunk in &file.hunks {
            for change in &hunk.changes {
                let DiffChange::Added { new_line, content } = change else {
                    continue;
                };

                let body = format!(
                    "Suggested change:\n```suggestion\n{}\n```",
                    content.trim()
                );
                let params = ReviewCommentParams {
                    pull_number: pr.number,
                    commit_id: pr.head.sha.clone(),
                    path: path.to_string(),
                    body,
                    line: *new_line,
                };

                match client.create_review_comment(&repo, &params).await {
                    Ok(()) => info!(path, line = new_line, "created inline review comment"),
                    Err(err) => error!(
                        path,
                        line = new_line,
                        error = %err,
                        "failed to create inline review comment"
                    ),
                }
            }
        }
    }
}
