//! Review prompt assembly.
//!
//! Builds one large text prompt from the PR snapshot: repository layout,
//! README, the serialized analysis context, linked-issue discussion, the
//! repository's review rules, and the response protocol (LGTM or a fenced
//! diff) the orchestrator later parses.

use crate::context::PrSnapshot;

/// Renders the full analysis prompt for one review cycle.
pub fn build_review_prompt(snapshot: &PrSnapshot, rules: &str) -> String {
    let analysis_context = serde_json::json!({
        "repository": snapshot.repository,
        "pr": snapshot,
        "rules": rules,
        "issue_context": snapshot.linked_issues,
    });
    let context_json =
        serde_json::to_string_pretty(&analysis_context).unwrap_or_else(|_| "{}".to_string());

    let issue_section = render_issue_section(snapshot);

    format!(
        r#"
Project Structure:
{structure}

README Content:
{readme}

PR Context:
{context_json}

{issue_section}

Given the above repository context and PR changes, please analyze the changes and:
1. Verify if the changes align with the project's structure and purpose as described in the README
2. Check if the changes follow the project's conventions visible in the folder structure
3. Suggest improvements or identify potential issues

Suggest the changes in the format of git diff.

You must follow the following pattern for suggestions:

Suggested change:
diff --git a/path/to/file b/path/to/file
index abc1234..def5678 100644
--- a/path/to/file
+++ b/path/to/file
@@ -line,count +line,count @@
actual diff content

Please check the codebase diff for the following rules:
{rules}

## IMPORTANT Instructions

Input: New hunks annotated with line numbers and old hunks (replaced code). Hunks represent incomplete code fragments.
Additional Context: PR title, description, summaries and comment chains.
Task: Review new hunks for substantive issues using provided context and respond with comments if necessary.
Output: Review comments in markdown with exact line number ranges in new hunks. Start and end line numbers must be within the same hunk. For single-line comments, start=end line number.
Use fenced code blocks using the relevant language identifier where applicable.
Don't annotate code snippets with line numbers. Format and indent code correctly.
For fixes, use `diff` code blocks, marking changes with `+` or `-`. The line number range for comments with fix snippets must exactly match the range to replace in the new hunk.

- Do NOT provide general feedback, summaries, explanations of changes, or praises
  for making good additions.
- Focus solely on offering specific, objective insights based on the
  given context and refrain from making broad comments about potential impacts on
  the system or question intentions behind the changes.
- Do NOT write anything else in the output, just the review comments or LGTM!.
- ONLY USE THE CONTEXT PROVIDED IN THE CURRENT PROMPT.
If there are no issues found, you MUST respond with the standalone word LGTM!.
"#,
        structure = snapshot.repository.structure,
        readme = snapshot.repository.readme,
        context_json = context_json,
        issue_section = issue_section,
        rules = rules,
    )
}

/// Human-readable linked-issue digest, mirroring the JSON context so the
/// model can quote discussions without unpacking JSON.
fn render_issue_section(snapshot: &PrSnapshot) -> String {
    let Some(bundle) = snapshot.linked_issues.as_ref().filter(|b| b.issues_count > 0) else {
        return "No linked issues found".to_string();
    };

    let mut out = format!("Linked Issues ({}):\n", bundle.issues_count);
    for issue in &bundle.issues {
        out.push_str(&format!(
            "\nNumber: #{}\nTitle: {}\nDescription: {}\nState: {}\nLabels: {}\nAssignees: {}\n",
            issue.number,
            issue.title,
            issue.body.as_deref().unwrap_or(""),
            issue.state,
            issue.labels.join(", "),
            issue.assignees.join(", "),
        ));
        out.push_str("\nIssue Discussion:\n");
        for c in &issue.comments {
            out.push_str(&format!("{} ({}): {}\n", c.author, c.created_at, c.body));
        }
    }
    out
}
