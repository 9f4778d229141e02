//! Review orchestration (step 3 of the pipeline).
//!
//! A short state machine over the model output:
//! - `LGTM` (exact word-boundary match) → acknowledgement comment, done;
//!   the diff interpreter is never invoked.
//! - no fenced diff block found → error comment, done.
//! - otherwise → inline comments from the diff, then the full model
//!   output as the summary comment.
//!
//! Each cycle is a fresh run; terminal states never loop back.

pub mod llm;
pub mod prompt;
pub mod rules;

use regex::Regex;
use tracing::{debug, error};

use crate::errors::PrResult;
use crate::github::{PullRequestEvent, RepoRef, SourceControlClient};
use crate::parser;
use crate::publish;

const LGTM_COMMENT: &str = "LGTM: LLM analysis is successful";
const PARSE_FAILED_COMMENT: &str = "Error: Could not parse diff from LLM output";

/// Posts the review derived from `llm_output` onto the PR.
pub async fn post_review(
    client: &SourceControlClient,
    event: &PullRequestEvent,
    llm_output: &str,
) -> PrResult<()> {
    let repo = RepoRef::from(&event.repository);
    let number = event.pull_request.number;

    // Word-boundary match so "LGTMx" or "lgtm" never short-circuit a
    // detailed review.
    let lgtm = Regex::new(r"\bLGTM\b").unwrap();
    if lgtm.is_match(llm_output) {
        debug!("step3: model approved (LGTM)");
        client.create_issue_comment(&repo, number, LGTM_COMMENT).await?;
        return Ok(());
    }

    let diff = parser::extract_diff_block(llm_output);
    if diff.is_empty() {
        error!("no valid diff found in LLM output");
        client
            .create_issue_comment(&repo, number, PARSE_FAILED_COMMENT)
            .await?;
        return Ok(());
    }

    publish::place_inline_comments(client, event, &diff).await;

    // Surface the full model output as the review summary.
    client.create_issue_comment(&repo, number, llm_output).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::SourceControlClient;
    use crate::github::recording::RecordingState;
    use crate::test_support::pr_event;

    #[tokio::test]
    async fn lgtm_skips_diff_interpretation() {
        let client = SourceControlClient::recording(RecordingState::default());
        let event = pr_event("t", None);

        // Diff-like content is present, but the LGTM token wins.
        let output = "LGTM\n```diff\n--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-a\n+b\n```";
        post_review(&client, &event, output).await.unwrap();

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert!(st.created_review_comments.is_empty());
            assert_eq!(st.created_issue_comments.len(), 1);
            assert_eq!(st.created_issue_comments[0].1, LGTM_COMMENT);
        }
    }

    #[tokio::test]
    async fn lowercase_or_embedded_lgtm_does_not_match() {
        let client = SourceControlClient::recording(RecordingState::default());
        let event = pr_event("t", None);

        post_review(&client, &event, "lgtm, also LGTMXL, no fences").await.unwrap();

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            // falls through to the parse-failed state
            assert_eq!(st.created_issue_comments[0].1, PARSE_FAILED_COMMENT);
        }
    }

    #[tokio::test]
    async fn missing_diff_posts_parse_error() {
        let client = SourceControlClient::recording(RecordingState::default());
        let event = pr_event("t", None);

        post_review(&client, &event, "prose without any diff fences").await.unwrap();

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert!(st.created_review_comments.is_empty());
            assert_eq!(st.created_issue_comments.len(), 1);
            assert_eq!(st.created_issue_comments[0].1, PARSE_FAILED_COMMENT);
        }
    }

    #[tokio::test]
    async fn detailed_review_posts_inline_and_summary() {
        let client = SourceControlClient::recording(RecordingState::default());
        let event = pr_event("t", None);

        let output = "Issues found.\n```diff\n--- a/src/x.rs\n+++ b/src/x.rs\n@@ -1,1 +1,2 @@\n keep\n+let y = 2;\n```";
        post_review(&client, &event, output).await.unwrap();

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert_eq!(st.created_review_comments.len(), 1);
            assert_eq!(st.created_review_comments[0].path, "src/x.rs");
            assert_eq!(st.created_review_comments[0].line, 2);
            // summary is the raw model output
            assert_eq!(st.created_issue_comments.len(), 1);
            assert_eq!(st.created_issue_comments[0].1, output);
        }
    }
}
