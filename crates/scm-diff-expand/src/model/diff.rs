//! Diff data structures representing a single file's changes.

use serde::{Deserialize, Serialize};

/// A single file's diff between two revisions.
///
/// Constructed once from a backend diff response (or from
/// [`parse_unified_diff`](crate::parser::parse_unified_diff)) and treated as
/// an immutable value afterwards: context expansion produces a *new*
/// `FileDiff` rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path in the old revision; `/dev/null` on added files.
    pub old_path: String,
    /// Path in the new revision.
    pub new_path: String,
    /// What happened to the file.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Change hunks, ascending by line number. Empty for binary files.
    #[serde(default)]
    pub hunks: Vec<Hunk>,
    /// URL template of the backend's line-range endpoint for this file,
    /// with `{start}` and `{end}` placeholders. Taken from the HAL
    /// `lines` link; absent when the backend offers no such endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_link: Option<String>,
}

impl FileDiff {
    /// Create a file diff with no hunks yet.
    pub fn new(kind: FileKind, old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            kind,
            hunks: Vec::new(),
            lines_link: None,
        }
    }

    /// Attach the line-range URL template.
    pub fn with_lines_link(mut self, href: impl Into<String>) -> Self {
        self.lines_link = Some(href.into());
        self
    }
}

/// File status in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Add,
    Modify,
    Delete,
    Copy,
    Rename,
}

/// A contiguous region of changes (hunk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Lines in this hunk.
    pub changes: Vec<Change>,
    /// Old file starting line (1-based). Absent on the missing side of
    /// synthesized add/delete boundary hunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_start: Option<u32>,
    /// New file starting line (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start: Option<u32>,
    /// Number of lines in the old version.
    #[serde(default)]
    pub old_lines: u32,
    /// Number of lines in the new version.
    #[serde(default)]
    pub new_lines: u32,
    /// True once no further context lines remain to fetch on this side.
    #[serde(default)]
    pub fully_expanded: bool,
}

impl Hunk {
    /// Create an empty hunk with the given header info.
    pub fn new(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> Self {
        Self {
            changes: Vec::new(),
            old_start: Some(old_start),
            new_start: Some(new_start),
            old_lines,
            new_lines,
            fully_expanded: false,
        }
    }

    /// Last new-revision line number covered by this hunk, per its header.
    pub fn last_new_line(&self) -> Option<u32> {
        self.new_start
            .map(|start| (start + self.new_lines).saturating_sub(1))
    }

    /// Whether the hunk ends in a context line (safe to expand below).
    pub fn ends_in_context(&self) -> bool {
        self.changes
            .last()
            .is_some_and(|c| c.kind == ChangeKind::Normal)
    }
}

/// A single line in the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Line type.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Line content without trailing newline.
    pub content: String,
    /// Line number in the old file (context and deletions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<u32>,
    /// Line number in the new file (context and insertions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
}

impl Change {
    /// Create a context line.
    pub fn normal(content: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: ChangeKind::Normal,
            content: content.into(),
            old_line_number: Some(old_line),
            new_line_number: Some(new_line),
        }
    }

    /// Create an inserted line.
    pub fn insert(content: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: ChangeKind::Insert,
            content: content.into(),
            old_line_number: None,
            new_line_number: Some(new_line),
        }
    }

    /// Create a deleted line.
    pub fn delete(content: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: ChangeKind::Delete,
            content: content.into(),
            old_line_number: Some(old_line),
            new_line_number: None,
        }
    }
}

/// Line type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Unchanged line (context).
    Normal,
    /// Added line (+).
    Insert,
    /// Removed line (-).
    Delete,
    /// Merge conflict marker region.
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_change_kinds() {
        let ctx = Change::normal("unchanged", 5, 5);
        assert_eq!(ctx.kind, ChangeKind::Normal);
        assert_eq!(ctx.old_line_number, Some(5));
        assert_eq!(ctx.new_line_number, Some(5));

        let ins = Change::insert("new line", 10);
        assert_eq!(ins.old_line_number, None);
        assert_eq!(ins.new_line_number, Some(10));

        let del = Change::delete("removed line", 8);
        assert_eq!(del.old_line_number, Some(8));
        assert_eq!(del.new_line_number, None);
    }

    #[test]
    fn test_last_new_line() {
        let hunk = Hunk::new(10, 5, 12, 7);
        assert_eq!(hunk.last_new_line(), Some(18));
    }

    #[test]
    fn test_ends_in_context() {
        let mut hunk = Hunk::new(1, 2, 1, 2);
        assert!(!hunk.ends_in_context());

        hunk.changes.push(Change::insert("added", 1));
        assert!(!hunk.ends_in_context());

        hunk.changes.push(Change::normal("ctx", 1, 2));
        assert!(hunk.ends_in_context());
    }

    #[test]
    fn test_serde_camel_case() {
        let mut file = FileDiff::new(FileKind::Add, "greeting.txt", "greeting.txt")
            .with_lines_link("http://scm.example/lines?start={start}&end={end}");
        let mut hunk = Hunk::new(0, 0, 1, 1);
        hunk.changes.push(Change::insert("hello", 1));
        file.hunks.push(hunk);

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "add");
        assert_eq!(json["newPath"], "greeting.txt");
        assert_eq!(json["hunks"][0]["newStart"], 1);
        assert_eq!(json["hunks"][0]["changes"][0]["newLineNumber"], 1);

        let back: FileDiff = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }
}
