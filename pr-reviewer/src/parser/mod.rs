//! Unified diff interpretation for model output and provider patches.
//!
//! Three small parsers live here:
//! - [`extract_diff_block`] pulls the first ```` ```diff ```` fenced block out
//!   of free-form model text.
//! - [`parse_unified_diff`] turns multi-file unified diff text into
//!   per-file/per-hunk structured changes with new-file line numbers.
//! - [`parse_patch`] splits a single provider patch into added/removed lines.
//!
//! All three are total: malformed input yields empty (or partial) output
//! instead of an error, so a bad model response can never abort a review.

use regex::Regex;

/// Sentinel the provider substitutes when a per-file patch is unavailable.
pub const DIFF_UNAVAILABLE: &str = "Diff too large to display";

/// Target path signaling that the diff deletes the file.
pub const DELETED_FILE_MARKER: &str = "/dev/null";

/// One changed line inside a diff hunk.
///
/// Only added lines carry a new-file line number; that number is what
/// anchors an inline review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffChange {
    Added { new_line: u32, content: String },
    Removed { content: String },
    Context { content: String },
}

/// A diff hunk (contiguous block of changes in one file region).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub changes: Vec<DiffChange>,
}

/// File-level section of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub source_path: Option<String>,
    pub target_path: Option<String>,
    pub hunks: Vec<DiffHunk>,
}

impl FileDiff {
    /// True when the diff removes the file (`+++ /dev/null`).
    /// Deleted files are enumerated but never receive inline comments.
    pub fn is_deleted(&self) -> bool {
        self.target_path.as_deref() == Some(DELETED_FILE_MARKER)
    }

    /// Path to anchor comments at: the new path, falling back to the old one.
    pub fn comment_path(&self) -> Option<&str> {
        self.target_path.as_deref().or(self.source_path.as_deref())
    }
}

/// Added/removed line lists extracted from a single file's patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchLines {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Extracts the first fenced ```` ```diff ... ``` ```` block from model text,
/// fences included.
///
/// Primary strategy is a non-greedy regex; if the opening fence exists but
/// the regex fails to produce a full match, a plain index scan is attempted.
/// Returns an empty string when no complete block is found — callers must
/// treat that as "no diff", not as a zero-length diff.
pub fn extract_diff_block(text: &str) -> String {
    let fence = Regex::new(r"(?s)```diff(.*?)```").unwrap();
    if let Some(caps) = fence.captures(text) {
        return format!("```diff{}```", &caps[1]);
    }

    // Fallback: opening fence present but malformed for the regex.
    if let Some(start) = text.find("```diff") {
        if let Some(rel) = text[start + 7..].find("```") {
            let end = start + 7 + rel + 3;
            return text[start..end].to_string();
        }
    }

    String::new()
}

/// Parses multi-file unified diff text into structured file diffs.
///
/// Recognized grammar:
/// - file headers `--- <path>` / `+++ <path>` (optional `a/`/`b/` prefixes
///   and trailing tab metadata are stripped; `/dev/null` is kept verbatim)
/// - hunk headers `@@ -<start>[,<count>] +<start>[,<count>] @@` with an
///   implied count of 1 when omitted
/// - change lines classified by leading `+` / `-` / anything else.
///
/// A running new-file line counter starts at each hunk's `new_start` and
/// advances on every added or context line (never on removals); its value
/// is attached to added lines. Hunk boundaries are tracked by the declared
/// old/new counts, so `---`-prefixed removals inside a hunk are never
/// mistaken for file headers. Unparseable text is skipped, never fatal.
pub fn parse_unified_diff(diff: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut hunk: Option<OpenHunk> = None;

    for line in diff.lines() {
        // Inside an active hunk, change markers win over header lookalikes.
        if let Some(open) = hunk.as_mut() {
            if open.remaining() {
                if let Some(content) = line.strip_prefix('+') {
                    open.push_added(content);
                    continue;
                }
                if let Some(content) = line.strip_prefix('-') {
                    open.push_removed(content);
                    continue;
                }
                if line.starts_with('\\') {
                    // "\ No newline at end of file" — annotation, not a change.
                    continue;
                }
                open.push_context(line.strip_prefix(' ').unwrap_or(line));
                continue;
            }
            flush_hunk(&mut hunk, &mut current);
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            // A source header starts the next file section.
            if current
                .as_ref()
                .is_some_and(|f| f.target_path.is_some() || !f.hunks.is_empty())
            {
                flush_file(&mut current, &mut files);
            }
            current.get_or_insert_with(empty_file).source_path = Some(clean_path(rest));
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            current.get_or_insert_with(empty_file).target_path = Some(clean_path(rest));
        } else if let Some(rest) = line.strip_prefix("@@") {
            if let Some(header) = parse_hunk_header(rest) {
                if current.is_none() {
                    current = Some(empty_file());
                }
                hunk = Some(OpenHunk::new(header));
            }
            // invalid header: skip silently, do not fail hard
        }
        // anything else (diff --git, index, commit noise) is ignored
    }

    flush_hunk(&mut hunk, &mut current);
    flush_file(&mut current, &mut files);
    files
}

/// Splits a single file's raw patch into added and removed line lists.
///
/// `None` and the "diff too large" sentinel both mean the diff is
/// unavailable and yield two empty lists. A line counts as added iff it
/// starts with `+` and is not the `+++` header (same for `-`/`---`); the
/// marker character is stripped from the stored content.
pub fn parse_patch(patch: Option<&str>) -> PatchLines {
    let Some(patch) = patch else {
        return PatchLines::default();
    };
    if patch == DIFF_UNAVAILABLE {
        return PatchLines::default();
    }

    let mut out = PatchLines::default();
    for line in patch.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            out.added.push(line[1..].to_string());
        } else if line.starts_with('-') && !line.starts_with("---") {
            out.removed.push(line[1..].to_string());
        }
    }
    out
}

// ===== internals =====

/// Hunk under construction plus the counters driving line numbering
/// and boundary detection.
struct OpenHunk {
    hunk: DiffHunk,
    next_new_line: u32,
    old_left: i64,
    new_left: i64,
}

impl OpenHunk {
    fn new(header: (u32, u32, u32, u32)) -> Self {
        let (old_start, old_count, new_start, new_count) = header;
        Self {
            hunk: DiffHunk {
                old_start,
                old_count,
                new_start,
                new_count,
                changes: Vec::new(),
            },
            next_new_line: new_start,
            old_left: old_count as i64,
            new_left: new_count as i64,
        }
    }

    /// True while the declared old/new line counts are not yet consumed.
    fn remaining(&self) -> bool {
        self.old_left > 0 || self.new_left > 0
    }

    fn push_added(&mut self, content: &str) {
        self.hunk.changes.push(DiffChange::Added {
            new_line: self.next_new_line,
            content: content.to_string(),
        });
        // Saturate: a body that disagrees with its header must not panic.
        self.next_new_line = self.next_new_line.saturating_add(1);
        self.new_left -= 1;
    }

    fn push_removed(&mut self, content: &str) {
        self.hunk.changes.push(DiffChange::Removed {
            content: content.to_string(),
        });
        self.old_left -= 1;
    }

    fn push_context(&mut self, content: &str) {
        self.hunk.changes.push(DiffChange::Context {
            content: content.to_string(),
        });
        self.next_new_line = self.next_new_line.saturating_add(1);
        self.old_left -= 1;
        self.new_left -= 1;
    }
}

fn empty_file() -> FileDiff {
    FileDiff {
        source_path: None,
        target_path: None,
        hunks: Vec::new(),
    }
}

fn flush_hunk(hunk: &mut Option<OpenHunk>, current: &mut Option<FileDiff>) {
    if let Some(open) = hunk.take() {
        current.get_or_insert_with(empty_file).hunks.push(open.hunk);
    }
}

fn flush_file(current: &mut Option<FileDiff>, files: &mut Vec<FileDiff>) {
    if let Some(file) = current.take() {
        files.push(file);
    }
}

/// Strips `a/`/`b/` prefixes and trailing tab metadata from a header path.
/// The `/dev/null` deletion marker is preserved as-is.
fn clean_path(raw: &str) -> String {
    let raw = raw.split('\t').next().unwrap_or(raw).trim();
    if raw == DELETED_FILE_MARKER {
        return raw.to_string();
    }
    raw.strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw)
        .to_string()
}

/// Parses the remainder of a `@@` header: ` -a[,b] +c[,d] @@ ...`.
/// A missing count defaults to 1 per unified-diff convention. Ranges
/// whose end does not fit the line counter are rejected like any other
/// malformed header.
fn parse_hunk_header(rest: &str) -> Option<(u32, u32, u32, u32)> {
    let mut parts = rest.trim().split_whitespace();
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    let (old_start, old_count) = split_range(old)?;
    let (new_start, new_count) = split_range(new)?;
    old_start.checked_add(old_count)?;
    new_start.checked_add(new_count)?;
    Some((old_start, old_count, new_start, new_count))
}

fn split_range(s: &str) -> Option<(u32, u32)> {
    let mut it = s.split(',');
    let start: u32 = it.next()?.parse().ok()?;
    let count: u32 = match it.next() {
        Some(c) => c.parse().ok()?,
        None => 1,
    };
    Some((start, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
diff --git a/src/app.js b/src/app.js
index abc1234..def5678 100644
--- a/src/app.js
+++ b/src/app.js
@@ -10,3 +10,4 @@
 const x = 1;
-const y = 2
+const y = 2;
+const z = 3;
 module.exports = x;
";

    #[test]
    fn extracts_fenced_diff_block_with_fences() {
        let out = extract_diff_block("```diff\nX\n```");
        assert_eq!(out, "```diff\nX\n```");
    }

    #[test]
    fn extracts_only_first_fenced_block() {
        let text = "intro\n```diff\n-a\n+b\n```\nmore\n```diff\n+c\n```";
        assert_eq!(extract_diff_block(text), "```diff\n-a\n+b\n```");
    }

    #[test]
    fn no_fences_yields_empty_string() {
        assert_eq!(extract_diff_block("no fences here"), "");
        assert_eq!(extract_diff_block("```diff never closed"), "");
    }

    #[test]
    fn parses_files_hunks_and_line_numbers() {
        let files = parse_unified_diff(SAMPLE);
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.source_path.as_deref(), Some("src/app.js"));
        assert_eq!(file.target_path.as_deref(), Some("src/app.js"));
        assert_eq!(file.hunks.len(), 1);

        let hunk = &file.hunks[0];
        assert_eq!((hunk.new_start, hunk.new_count), (10, 4));

        let added: Vec<(u32, &str)> = hunk
            .changes
            .iter()
            .filter_map(|c| match c {
                DiffChange::Added { new_line, content } => Some((*new_line, content.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(added, vec![(11, "const y = 2;"), (12, "const z = 3;")]);
    }

    #[test]
    fn new_line_counter_replays_hunk_header() {
        // Walking changes and counting every non-removed line must land on
        // exactly new_start..new_start+new_count.
        for file in parse_unified_diff(SAMPLE) {
            for hunk in &file.hunks {
                let mut line = hunk.new_start;
                for change in &hunk.changes {
                    match change {
                        DiffChange::Added { new_line, .. } => {
                            assert_eq!(*new_line, line);
                            line += 1;
                        }
                        DiffChange::Context { .. } => line += 1,
                        DiffChange::Removed { .. } => {}
                    }
                }
                assert_eq!(line, hunk.new_start + hunk.new_count);
            }
        }
    }

    #[test]
    fn omitted_count_defaults_to_one() {
        let diff = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-old\n+new\n";
        let files = parse_unified_diff(diff);
        let hunk = &files[0].hunks[0];
        assert_eq!((hunk.old_start, hunk.old_count), (1, 1));
        assert_eq!((hunk.new_start, hunk.new_count), (1, 1));
        assert_eq!(
            hunk.changes[1],
            DiffChange::Added {
                new_line: 1,
                content: "new".into()
            }
        );
    }

    #[test]
    fn deleted_file_is_marked() {
        let diff = "--- a/gone.txt\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-a\n-b\n";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 1);
        assert!(files[0].is_deleted());
        assert_eq!(files[0].source_path.as_deref(), Some("gone.txt"));
    }

    #[test]
    fn two_file_diff_splits_on_second_header() {
        let diff = "\
--- a/one.rs
+++ b/one.rs
@@ -1,1 +1,2 @@
 keep
+added
--- a/two.rs
+++ b/two.rs
@@ -5,1 +5,1 @@
-before
+after
";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].target_path.as_deref(), Some("one.rs"));
        assert_eq!(files[1].target_path.as_deref(), Some("two.rs"));
        assert_eq!(files[1].hunks[0].new_start, 5);
    }

    #[test]
    fn malformed_input_never_panics() {
        assert!(parse_unified_diff("").is_empty());
        assert!(parse_unified_diff("total garbage\nnothing diffy").is_empty());
        // broken hunk header is skipped, file section still enumerated
        let files = parse_unified_diff("--- a/f\n+++ b/f\n@@ nonsense @@\n+x\n");
        assert_eq!(files.len(), 1);
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn hunk_range_past_line_counter_limit_is_rejected() {
        // new_start + new_count exceeds u32 — the header is treated as
        // malformed, not a panic source.
        let diff = "--- a/f\n+++ b/f\n@@ -1,1 +4294967295,2 @@\n+x\n+y\n";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 1);
        assert!(files[0].hunks.is_empty());

        // same on the old side
        let diff = "--- a/f\n+++ b/f\n@@ -4294967295,2 +1,1 @@\n-x\n-y\n+z\n";
        assert!(parse_unified_diff(diff)[0].hunks.is_empty());

        // a range ending exactly at the limit still parses; the counter
        // saturates even when the body overruns the declared counts
        let diff = "--- a/f\n+++ b/f\n@@ -1,4 +4294967292,3 @@\n line\n line\n line\n line\n";
        let files = parse_unified_diff(diff);
        assert_eq!(files[0].hunks.len(), 1);
        assert_eq!(files[0].hunks[0].changes.len(), 4);
    }

    #[test]
    fn parse_is_idempotent() {
        let first = parse_unified_diff(SAMPLE);
        let second = parse_unified_diff(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn patch_lines_skip_header_markers() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n-old line\n+new line\n context";
        let lines = parse_patch(Some(patch));
        assert_eq!(lines.added, vec!["new line"]);
        assert_eq!(lines.removed, vec!["old line"]);
    }

    #[test]
    fn unavailable_patch_yields_empty_lists() {
        assert_eq!(parse_patch(None), PatchLines::default());
        assert_eq!(parse_patch(Some(DIFF_UNAVAILABLE)), PatchLines::default());
    }
}
