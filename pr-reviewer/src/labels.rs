//! Review label taxonomy and application.
//!
//! Every cycle ends with exactly one label mutation: all known review
//! labels are removed (missing ones are ignored) and exactly one is added
//! based on the model verdict.

use tracing::{debug, error, info};

use crate::github::{RepoRef, SourceControlClient};

#[derive(Debug, Clone, Copy)]
pub struct LabelSpec {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub const LABEL_CONFIGS: [LabelSpec; 3] = [
    LabelSpec {
        name: "LGTM",
        color: "0e8a16",
        description: "Changes look good to merge",
    },
    LabelSpec {
        name: "Needs Changes",
        color: "d93f0b",
        description: "Changes requested by automated review",
    },
    LabelSpec {
        name: "Spam",
        color: "b60205",
        description: "Potentially spam or irrelevant changes",
    },
];

/// Picks the review label for a model response.
pub fn determine_label(llm_output: &str) -> &'static str {
    let lower = llm_output.to_lowercase();
    if lower.contains("lgtm!") {
        "LGTM"
    } else if lower.contains("spam") || (lower.len() < 10 && !is_valid_short_response(&lower)) {
        "Spam"
    } else {
        "Needs Changes"
    }
}

/// Very short responses that still read as a real verdict.
fn is_valid_short_response(response: &str) -> bool {
    const VALID: [&str; 8] = ["ok", "yes", "no", "good", "fine", "nice", "approved", "+1"];
    VALID.iter().any(|v| response.contains(v))
}

/// Removes every known review label, then adds `label`.
///
/// Removal failures are expected (the label may simply not be present)
/// and ignored; only the final add is treated as the success signal.
pub async fn apply_review_label(
    client: &SourceControlClient,
    repo: &RepoRef,
    pr_number: u64,
    label: &str,
) -> bool {
    for spec in &LABEL_CONFIGS {
        if let Err(err) = client.remove_label(repo, pr_number, spec.name).await {
            debug!(label = spec.name, error = %err, "label not present or not removable");
        }
    }

    match client
        .add_labels(repo, pr_number, &[label.to_string()])
        .await
    {
        Ok(()) => {
            info!(label, "review label applied");
            true
        }
        Err(err) => {
            error!(label, error = %err, "error adding label");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::SourceControlClient;
    use crate::github::recording::RecordingState;
    use crate::test_support::repo_ref;

    #[test]
    fn verdict_mapping() {
        assert_eq!(determine_label("All good. LGTM!"), "LGTM");
        assert_eq!(determine_label("this looks like spam"), "Spam");
        assert_eq!(determine_label("x"), "Spam"); // too short, not a verdict
        assert_eq!(determine_label("ok"), "Needs Changes"); // short but valid
        assert_eq!(
            determine_label("Several issues found:\n```diff\n+fix\n```"),
            "Needs Changes"
        );
    }

    #[tokio::test]
    async fn removes_known_labels_then_adds_one() {
        let client = SourceControlClient::recording(RecordingState::default());
        assert!(apply_review_label(&client, &repo_ref(), 1, "Needs Changes").await);

        if let SourceControlClient::Recording(rec) = &client {
            let st = rec.state();
            assert_eq!(st.removed_labels, vec!["LGTM", "Needs Changes", "Spam"]);
            assert_eq!(st.added_labels, vec!["Needs Changes"]);
        }
    }

    #[tokio::test]
    async fn remove_failure_still_adds_label() {
        let state = RecordingState {
            fail_remove_label: true,
            ..Default::default()
        };
        let client = SourceControlClient::recording(state);
        assert!(apply_review_label(&client, &repo_ref(), 1, "LGTM").await);

        if let SourceControlClient::Recording(rec) = &client {
            assert_eq!(rec.state().added_labels, vec!["LGTM"]);
        }
    }
}
