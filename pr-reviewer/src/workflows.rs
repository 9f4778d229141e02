//! CI workflow dispatch (step 5 of the pipeline).
//!
//! After a review lands, three workflows are triggered against the PR head
//! ref. Dispatch failures with a well-known cause (404/403/422) are reported
//! on the PR and swallowed so the remaining workflows still run; anything
//! else aborts the cycle.

use tracing::{debug, error, info};

use crate::errors::{Error, PrResult, WorkflowError};
use crate::github::{PullRequestEvent, RepoRef, SourceControlClient};

/// One workflow to dispatch, with an optional announcement comment posted
/// before the dispatch call.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowTrigger {
    pub workflow_id: &'static str,
    pub label: &'static str,
    pub announce: Option<&'static str>,
}

const TRIGGERS: [WorkflowTrigger; 3] = [
    WorkflowTrigger {
        workflow_id: "tests.yaml",
        label: "tests",
        announce: None,
    },
    WorkflowTrigger {
        workflow_id: "security.yaml",
        label: "security",
        announce: Some("Running security check"),
    },
    WorkflowTrigger {
        workflow_id: "lint.yaml",
        label: "lint",
        announce: None,
    },
];

/// Dispatches the CI workflow set for the PR head ref.
pub async fn dispatch_ci_workflows(
    client: &SourceControlClient,
    event: &PullRequestEvent,
) -> PrResult<()> {
    let repo = RepoRef::from(&event.repository);
    let pr = &event.pull_request;

    let (tests, security, lint) = tokio::join!(
        trigger_workflow(client, &repo, pr.number, &pr.head.git_ref, &TRIGGERS[0]),
        trigger_workflow(client, &repo, pr.number, &pr.head.git_ref, &TRIGGERS[1]),
        trigger_workflow(client, &repo, pr.number, &pr.head.git_ref, &TRIGGERS[2]),
    );
    tests?;
    security?;
    lint?;
    Ok(())
}

/// Dispatches one workflow, posting the announcement first when present.
///
/// 404, 403 and 422 responses are explained with a PR comment and then
/// swallowed; other failures bubble up as [`WorkflowError`].
async fn trigger_workflow(
    client: &SourceControlClient,
    repo: &RepoRef,
    pr_number: u64,
    git_ref: &str,
    trigger: &WorkflowTrigger,
) -> PrResult<()> {
    if let Some(announcement) = trigger.announce {
        if let Err(err) = client.create_issue_comment(repo, pr_number, announcement).await {
            debug!(workflow = trigger.workflow_id, error = %err, "announcement comment failed");
        }
    }

    match client.dispatch_workflow(repo, trigger.workflow_id, git_ref).await {
        Ok(()) => {
            info!(workflow = trigger.workflow_id, git_ref, "workflow dispatched");
            Ok(())
        }
        Err(err) => {
            let status = err.status_code();
            let reason = match status {
                Some(404) => "Workflow file not found or inaccessible".to_string(),
                Some(403) => "Permission denied to access or trigger workflow".to_string(),
                Some(422) => {
                    "Request validation failed, please check workflow configuration".to_string()
                }
                _ => format!("{err}"),
            };
            error!(workflow = trigger.workflow_id, error = %err, "workflow dispatch failed");

            let body = format!(
                "Failed to trigger {} workflow: {}",
                trigger.label, reason
            );
            if let Err(comment_err) = client.create_issue_comment(repo, pr_number, &body).await {
                error!(error = %comment_err, "failed to report workflow dispatch failure");
            }

            match status {
                Some(404) | Some(403) | Some(422) => Ok(()),
                _ => Err(Error::Workflow(WorkflowError {
                    workflow_id: trigger.workflow_id.to_string(),
                    message: reason,
                    status,
                })),
            }
        }
    }
}
