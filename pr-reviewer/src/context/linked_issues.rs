//! Linked-issue resolution: `#NNN` references in the PR text are expanded
//! into full issue records with their comment threads.

use regex::Regex;

use crate::context::types::{IssueCommentInfo, LinkedIssue, LinkedIssueBundle};
use crate::errors::PrResult;
use crate::github::{RepoRef, SourceControlClient};

/// Scans text for integer references following a `#` marker
/// ("fixes #123", "related to #7").
///
/// Duplicates are kept on purpose: the aggregator fetches each occurrence,
/// matching the upstream behavior.
pub fn extract_issue_numbers(text: &str) -> Vec<u64> {
    let re = Regex::new(r"#(\d+)").unwrap();
    re.captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Fetches every referenced issue plus its full comment thread.
///
/// Detail and thread are fetched concurrently per issue. Any single
/// failure fails the whole bundle — the caller decides what to do with
/// the partial data loss (currently: drop everything and log).
pub async fn fetch_linked_issues(
    client: &SourceControlClient,
    repo: &RepoRef,
    numbers: &[u64],
) -> PrResult<LinkedIssueBundle> {
    let mut issues = Vec::with_capacity(numbers.len());

    for &number in numbers {
        let (issue, thread) = tokio::join!(
            client.get_issue(repo, number),
            client.list_issue_comments(repo, number)
        );
        let issue = issue?;
        let thread = thread?;

        issues.push(LinkedIssue {
            number: issue.number,
            title: issue.title,
            body: issue.body,
            state: issue.state,
            author: issue.user.login,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            comments: thread
                .into_iter()
                .map(|c| IssueCommentInfo {
                    author: c.user.map(|u| u.login).unwrap_or_else(|| "unknown".into()),
                    body: c.body.unwrap_or_default(),
                    created_at: c.created_at,
                })
                .collect(),
        });
    }

    Ok(LinkedIssueBundle {
        issues_count: issues.len(),
        issues,
    })
}
