//! Parse unified diff format (as produced by the backend diff endpoint).

use crate::model::{Change, ChangeKind, FileDiff, FileKind, Hunk};
use thiserror::Error;
use unidiff::{Hunk as UnidiffHunk, Line as UnidiffLine, PatchSet, PatchedFile};

/// Errors that can occur during diff parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse diff: {0}")]
    ParseFailed(String),
}

/// Parse a unified diff string into one `FileDiff` per touched file.
///
/// Binary files produce a `FileDiff` with an empty hunk list. The parser
/// never produces [`ChangeKind::Conflict`]; conflict markers only appear
/// in diffs the backend delivers pre-structured.
///
/// # Example
/// ```ignore
/// let files = parse_unified_diff(diff_text)?;
/// println!("changed files: {}", files.len());
/// ```
pub fn parse_unified_diff(diff_text: &str) -> Result<Vec<FileDiff>, ParseError> {
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(diff_text)
        .map_err(|e| ParseError::ParseFailed(e.to_string()))?;

    Ok(patch_set.files().iter().map(parse_patched_file).collect())
}

fn parse_patched_file(file: &PatchedFile) -> FileDiff {
    let source = clean_path(&file.source_file);
    let target = clean_path(&file.target_file);
    let kind = determine_kind(&source, &target);

    let mut file_diff = FileDiff::new(kind, source, target);
    for hunk in file.hunks() {
        file_diff.hunks.push(parse_hunk(hunk));
    }
    file_diff
}

fn parse_hunk(hunk: &UnidiffHunk) -> Hunk {
    let mut parsed = Hunk::new(
        hunk.source_start as u32,
        hunk.source_length as u32,
        hunk.target_start as u32,
        hunk.target_length as u32,
    );
    parsed.changes = hunk.lines().iter().filter_map(parse_line).collect();
    parsed
}

fn parse_line(line: &UnidiffLine) -> Option<Change> {
    let kind = match line.line_type.as_str() {
        " " => ChangeKind::Normal,
        "+" => ChangeKind::Insert,
        "-" => ChangeKind::Delete,
        // "\ No newline at end of file" carries no content of its own
        _ => return None,
    };
    Some(Change {
        kind,
        content: line.value.to_string(),
        old_line_number: line.source_line_no.map(|n| n as u32),
        new_line_number: line.target_line_no.map(|n| n as u32),
    })
}

fn determine_kind(source: &str, target: &str) -> FileKind {
    if source == "/dev/null" || source.is_empty() {
        FileKind::Add
    } else if target == "/dev/null" || target.is_empty() {
        FileKind::Delete
    } else if source != target {
        FileKind::Rename
    } else {
        FileKind::Modify
    }
}

/// Clean the path by removing a/b prefixes from git diff output.
fn clean_path(path: &str) -> String {
    let path = path.trim();
    if let Some(stripped) = path.strip_prefix("a/") {
        return stripped.to_string();
    }
    if let Some(stripped) = path.strip_prefix("b/") {
        return stripped.to_string();
    }
    path.to_string()
}
