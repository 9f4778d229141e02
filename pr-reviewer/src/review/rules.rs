//! Repository review rules (`rules.md` at the PR head ref).

use tracing::warn;

use crate::github::{RepoRef, SourceControlClient};

pub const FALLBACK_RULES: &str =
    "No specific rules found. Please follow general good practices.";

const RULES_PATH: &str = "rules.md";

/// Loads `rules.md` from the repository at the head ref.
///
/// Retrieval failures (missing file, bad encoding, network) degrade to
/// the fallback guidance; rules are advisory, never a reason to abort.
/// A file that fetches but is empty passes through as empty rules.
pub async fn fetch_review_rules(
    client: &SourceControlClient,
    repo: &RepoRef,
    head_ref: &str,
) -> String {
    match client.get_file_content(repo, RULES_PATH, head_ref).await {
        Ok(content) => {
            if content.trim().is_empty() {
                warn!("rules.md is present but empty");
            }
            content
        }
        Err(err) => {
            warn!(error = %err, "rules.md not available");
            FALLBACK_RULES.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::SourceControlClient;
    use crate::github::recording::RecordingState;
    use crate::test_support::repo_ref;

    #[tokio::test]
    async fn present_rules_are_returned_verbatim() {
        let mut state = RecordingState::default();
        state
            .file_contents
            .insert("rules.md".to_string(), "- no unwrap in handlers\n".to_string());
        let client = SourceControlClient::recording(state);

        let rules = fetch_review_rules(&client, &repo_ref(), "feature").await;
        assert_eq!(rules, "- no unwrap in handlers\n");
    }

    #[tokio::test]
    async fn empty_rules_pass_through() {
        let mut state = RecordingState::default();
        state.file_contents.insert("rules.md".to_string(), String::new());
        let client = SourceControlClient::recording(state);

        let rules = fetch_review_rules(&client, &repo_ref(), "feature").await;
        assert_eq!(rules, "");
    }

    #[tokio::test]
    async fn missing_rules_use_fallback() {
        let client = SourceControlClient::recording(RecordingState::default());

        let rules = fetch_review_rules(&client, &repo_ref(), "feature").await;
        assert_eq!(rules, FALLBACK_RULES);
    }
}
