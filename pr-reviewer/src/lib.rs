//! Automated pull-request review pipeline.
//!
//! One review cycle runs:
//! 1. aggregate the PR snapshot (files, comments, repository context,
//!    linked issues),
//! 2. load the repository review rules and build the analysis prompt,
//! 3. run the model and label the PR with its verdict,
//! 4. post the review (LGTM acknowledgement, or inline comments plus a
//!    summary),
//! 5. dispatch the CI workflow set.
//!
//! [`handle_pr_event`] wraps the cycle with a top-level error comment so a
//! failed run is always visible on the PR itself.

pub mod context;
pub mod errors;
pub mod github;
pub mod labels;
pub mod parser;
pub mod publish;
pub mod review;
pub mod workflows;

#[cfg(test)]
pub(crate) mod test_support;

use tracing::{debug, error, info};

use errors::PrResult;
use github::{PullRequestEvent, RepoRef, SourceControlClient};
use review::llm::LlmClient;

/// Runs one full review cycle for `event`.
pub async fn run_review(
    client: &SourceControlClient,
    llm: &LlmClient,
    event: &PullRequestEvent,
) -> PrResult<()> {
    let repo = RepoRef::from(&event.repository);
    let pr = &event.pull_request;
    info!(pr = pr.number, owner = %repo.owner, repo = %repo.repo, "review cycle start");

    debug!("step1: collecting PR snapshot");
    let snapshot = context::collect_pr_snapshot(client, event).await;

    debug!("step2: building prompt");
    let rules = review::rules::fetch_review_rules(client, &repo, &pr.head.git_ref).await;
    let prompt = review::prompt::build_review_prompt(&snapshot, &rules);

    debug!("step3: running model analysis");
    let llm_output = llm.analyze(&prompt).await;

    debug!("step4: labeling and posting review");
    let label = labels::determine_label(&llm_output);
    labels::apply_review_label(client, &repo, pr.number, label).await;
    review::post_review(client, event, &llm_output).await?;

    debug!("step5: dispatching CI workflows");
    workflows::dispatch_ci_workflows(client, event).await?;

    info!(pr = pr.number, label, "review cycle complete");
    Ok(())
}

/// Entry point for webhook delivery: runs the cycle and reports any
/// failure as a top-level PR comment (best effort) instead of bubbling it
/// to the HTTP layer.
pub async fn handle_pr_event(
    client: &SourceControlClient,
    llm: &LlmClient,
    event: &PullRequestEvent,
) {
    if let Err(err) = run_review(client, llm, event).await {
        error!(pr = event.pull_request.number, error = %err, "review cycle failed");

        let repo = RepoRef::from(&event.repository);
        let body = format!(
            "## Error Processing PR\nAn error occurred while analyzing this PR:\n```\n{err}\n```\nPlease check the application logs for more details."
        );
        if let Err(comment_err) = client
            .create_issue_comment(&repo, event.pull_request.number, &body)
            .await
        {
            error!(error = %comment_err, "failed to post error comment");
        }
    }
}
