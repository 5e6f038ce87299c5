//! Lazy context-line expansion over an immutable [`FileDiff`].
//!
//! [`DiffExpander`] answers how much context remains around each hunk
//! boundary and, on request, fetches that context through a
//! [`LineFetcher`] and splices it into a *new* `FileDiff`. The value it
//! was constructed over is never mutated, so a failed fetch leaves the
//! caller's diff untouched and the action retryable.

use crate::model::{Change, FileDiff, FileKind, Hunk};
use crate::traits::{FetchError, LineBound, LineFetcher};
use log::debug;
use thiserror::Error;

/// Errors that can occur when expanding a hunk.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The hunk index is beyond the file's hunk list.
    #[error("hunk index {index} out of range ({count} hunks)")]
    HunkIndex {
        /// Requested 0-based hunk index.
        index: usize,
        /// Number of hunks in the file.
        count: usize,
    },

    /// The file carries no line-range link to fetch context from.
    #[error("no lines link for {0}")]
    NoLinesLink(String),

    /// The computed range for this boundary is empty.
    #[error("nothing to expand at hunk {0}")]
    NothingToExpand(usize),

    /// The hunk misses the line numbers the range math needs.
    #[error("hunk {0} has no line numbers to expand from")]
    MissingLineNumbers(usize),

    /// The line fetch failed; the original diff is unchanged.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Context still available below a hunk.
///
/// The rendering contract encodes this as an integer (`0` = nothing left,
/// hide the control; `-1` = unknown bound, offer expand-to-end; `n` =
/// exactly that many lines); [`as_lines`](BottomRange::as_lines) produces
/// that encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottomRange {
    /// No further context remains.
    Exhausted,
    /// Exactly this many lines sit between this hunk and the next.
    Bounded(u32),
    /// Last hunk of the file; the remaining line count is unknown.
    Unbounded,
}

impl BottomRange {
    /// Numeric encoding used by the presentation layer.
    pub fn as_lines(&self) -> i64 {
        match self {
            BottomRange::Exhausted => 0,
            BottomRange::Bounded(n) => i64::from(*n),
            BottomRange::Unbounded => -1,
        }
    }
}

/// Computes and performs context expansion for one [`FileDiff`].
///
/// The expander borrows the diff and a [`LineFetcher`]; query operations
/// are pure, command operations issue exactly one fetch and return a new
/// `FileDiff` with the synthetic context hunk spliced in.
///
/// Concurrent commands against the same hunk index are not coordinated
/// here; callers serialize them.
pub struct DiffExpander<'a> {
    file: &'a FileDiff,
    fetcher: &'a dyn LineFetcher,
}

impl<'a> DiffExpander<'a> {
    /// Create an expander over `file`, fetching lines through `fetcher`.
    pub fn new(file: &'a FileDiff, fetcher: &'a dyn LineFetcher) -> Self {
        Self { file, fetcher }
    }

    /// Number of hunks; 0 for binary files or files without a diff.
    pub fn hunk_count(&self) -> usize {
        self.file.hunks.len()
    }

    /// Context lines available immediately above hunk `n`.
    ///
    /// Deleted files have no new revision to pull lines from, so the
    /// answer is always 0 there.
    pub fn max_expand_head_range(&self, n: usize) -> u32 {
        if self.file.kind == FileKind::Delete {
            return 0;
        }
        let Some(hunk) = self.file.hunks.get(n) else {
            return 0;
        };
        let Some(new_start) = hunk.new_start else {
            return 0;
        };
        if n == 0 {
            return new_start.saturating_sub(1);
        }
        match self.file.hunks[n - 1].last_new_line() {
            Some(prev_end) => new_start.saturating_sub(prev_end + 1),
            None => 0,
        }
    }

    /// Context available below hunk `n`.
    ///
    /// Added and deleted files never expand downwards. A hunk ending in a
    /// non-context line is not expanded either; splicing below it would
    /// require re-parsing the change itself.
    pub fn max_expand_bottom_range(&self, n: usize) -> BottomRange {
        if matches!(self.file.kind, FileKind::Add | FileKind::Delete) {
            return BottomRange::Exhausted;
        }
        let Some(hunk) = self.file.hunks.get(n) else {
            return BottomRange::Exhausted;
        };
        if !hunk.ends_in_context() {
            return BottomRange::Exhausted;
        }
        if n + 1 == self.file.hunks.len() {
            return if hunk.fully_expanded {
                BottomRange::Exhausted
            } else {
                BottomRange::Unbounded
            };
        }
        let (Some(end), Some(next_start)) =
            (hunk.last_new_line(), self.file.hunks[n + 1].new_start)
        else {
            return BottomRange::Exhausted;
        };
        match next_start.saturating_sub(end + 1) {
            0 => BottomRange::Exhausted,
            gap => BottomRange::Bounded(gap),
        }
    }

    /// Fetch up to `count` context lines ending right above hunk `n` and
    /// return a new `FileDiff` with an all-context hunk inserted before it.
    pub async fn expand_head(&self, n: usize, count: u32) -> Result<FileDiff, ExpandError> {
        let hunk = self.hunk(n)?;
        let requested = count.min(self.max_expand_head_range(n));
        if requested == 0 {
            return Err(ExpandError::NothingToExpand(n));
        }
        let new_start = hunk.new_start.ok_or(ExpandError::MissingLineNumbers(n))?;
        let old_start = hunk.old_start.ok_or(ExpandError::MissingLineNumbers(n))?;

        let start = new_start - requested;
        let end = new_start - 1;
        debug!(
            "expanding {} lines above hunk {} of {} ({}..={})",
            requested, n, self.file.new_path, start, end
        );
        let lines = self
            .fetcher
            .fetch_lines(self.lines_link()?, start, LineBound::Line(end))
            .await?;

        let fully_expanded = (lines.len() as u32) < requested;
        let context = context_hunk(
            old_start.saturating_sub(requested),
            start,
            lines,
            fully_expanded,
        );
        Ok(self.spliced(n, context))
    }

    /// Fetch context lines starting right below hunk `n` and return a new
    /// `FileDiff` with an all-context hunk inserted after it.
    ///
    /// A non-positive `count` (the `-1` convention) requests the remainder
    /// of the file unconditionally; the resulting hunk is then marked
    /// fully expanded, as it also is whenever the backend returns fewer
    /// lines than requested.
    pub async fn expand_bottom(&self, n: usize, count: i64) -> Result<FileDiff, ExpandError> {
        let hunk = self.hunk(n)?;
        let last = hunk
            .changes
            .last()
            .ok_or(ExpandError::MissingLineNumbers(n))?;
        let new_start = last
            .new_line_number
            .ok_or(ExpandError::MissingLineNumbers(n))?
            + 1;
        let old_start = last
            .old_line_number
            .ok_or(ExpandError::MissingLineNumbers(n))?
            + 1;

        let (end, requested) = if count <= 0 {
            (LineBound::Eof, -1)
        } else {
            let take = match self.max_expand_bottom_range(n) {
                BottomRange::Exhausted => return Err(ExpandError::NothingToExpand(n)),
                BottomRange::Bounded(gap) => u32::try_from(count).unwrap_or(u32::MAX).min(gap),
                // keep new_start + take - 1 representable
                BottomRange::Unbounded => u32::try_from(count)
                    .unwrap_or(u32::MAX)
                    .min(u32::MAX - new_start),
            };
            (LineBound::Line(new_start + take - 1), i64::from(take))
        };
        debug!(
            "expanding below hunk {} of {} (start {}, end {})",
            n,
            self.file.new_path,
            new_start,
            end.as_wire()
        );
        let lines = self
            .fetcher
            .fetch_lines(self.lines_link()?, new_start, end)
            .await?;

        let fully_expanded = requested < 0 || (lines.len() as i64) < requested;
        let context = context_hunk(old_start, new_start, lines, fully_expanded);
        Ok(self.spliced(n + 1, context))
    }

    fn hunk(&self, n: usize) -> Result<&Hunk, ExpandError> {
        self.file.hunks.get(n).ok_or(ExpandError::HunkIndex {
            index: n,
            count: self.file.hunks.len(),
        })
    }

    fn lines_link(&self) -> Result<&str, ExpandError> {
        self.file
            .lines_link
            .as_deref()
            .ok_or_else(|| ExpandError::NoLinesLink(self.file.new_path.clone()))
    }

    /// Copy of the file with `hunk` inserted at ordinal position `at`.
    fn spliced(&self, at: usize, hunk: Hunk) -> FileDiff {
        let mut file = self.file.clone();
        file.hunks.insert(at, hunk);
        file
    }
}

/// Build an all-context hunk from fetched lines, numbering both sides
/// upwards from the given starts.
fn context_hunk(old_start: u32, new_start: u32, lines: Vec<String>, fully_expanded: bool) -> Hunk {
    let changes: Vec<Change> = lines
        .into_iter()
        .enumerate()
        .map(|(i, content)| Change::normal(content, old_start + i as u32, new_start + i as u32))
        .collect();
    let count = changes.len() as u32;
    Hunk {
        changes,
        old_start: Some(old_start),
        new_start: Some(new_start),
        old_lines: count,
        new_lines: count,
        fully_expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeKind;
    use crate::traits::NoOpLineFetcher;
    use pretty_assertions::assert_eq;

    fn hunk_with_context(old_start: u32, new_start: u32, lines: u32) -> Hunk {
        let mut hunk = Hunk::new(old_start, lines, new_start, lines);
        for i in 0..lines {
            hunk.changes
                .push(Change::normal(format!("line {}", i), old_start + i, new_start + i));
        }
        hunk
    }

    /// Four hunks with gaps of 5 and 1 around hunk 1.
    fn four_hunk_modify() -> FileDiff {
        let mut file = FileDiff::new(FileKind::Modify, "a.rs", "a.rs")
            .with_lines_link("http://scm.example/lines?start={start}&end={end}");
        file.hunks.push(hunk_with_context(1, 1, 4)); // lines 1..=4
        file.hunks.push(hunk_with_context(10, 10, 3)); // lines 10..=12
        file.hunks.push(hunk_with_context(14, 14, 4)); // lines 14..=17
        file.hunks.push(hunk_with_context(30, 30, 2)); // lines 30..=31
        file
    }

    #[test]
    fn test_hunk_count() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.hunk_count(), 4);

        let binary = FileDiff::new(FileKind::Add, "logo.png", "logo.png");
        let expander = DiffExpander::new(&binary, &NoOpLineFetcher);
        assert_eq!(expander.hunk_count(), 0);
    }

    #[test]
    fn test_head_range_of_first_hunk_counts_from_file_top() {
        let mut file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_head_range(0), 0);

        file.hunks[0].new_start = Some(8);
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_head_range(0), 7);
    }

    #[test]
    fn test_head_range_is_gap_to_previous_hunk() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_head_range(1), 5);
        assert_eq!(expander.max_expand_head_range(2), 1);
        assert_eq!(expander.max_expand_head_range(3), 12);
    }

    #[test]
    fn test_head_range_zero_for_deleted_file() {
        let mut file = four_hunk_modify();
        file.kind = FileKind::Delete;
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        for n in 0..4 {
            assert_eq!(expander.max_expand_head_range(n), 0);
        }
    }

    #[test]
    fn test_bottom_range_is_gap_to_next_hunk() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_bottom_range(1), BottomRange::Bounded(1));
        assert_eq!(expander.max_expand_bottom_range(2).as_lines(), 12);
    }

    #[test]
    fn test_bottom_range_zero_for_add_and_delete() {
        for kind in [FileKind::Add, FileKind::Delete] {
            let mut file = four_hunk_modify();
            file.kind = kind;
            let expander = DiffExpander::new(&file, &NoOpLineFetcher);
            for n in 0..4 {
                assert_eq!(expander.max_expand_bottom_range(n).as_lines(), 0);
            }
        }
    }

    #[test]
    fn test_bottom_range_of_last_hunk_is_unbounded() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_bottom_range(3), BottomRange::Unbounded);
        assert_eq!(expander.max_expand_bottom_range(3).as_lines(), -1);
    }

    #[test]
    fn test_bottom_range_exhausted_once_fully_expanded() {
        let mut file = four_hunk_modify();
        file.hunks[3].fully_expanded = true;
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_bottom_range(3), BottomRange::Exhausted);
    }

    #[test]
    fn test_bottom_range_exhausted_when_hunk_ends_in_change() {
        let mut file = four_hunk_modify();
        file.hunks[1].changes.push(Change::insert("trailing", 13));
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_bottom_range(1), BottomRange::Exhausted);
    }

    #[test]
    fn test_bottom_range_exhausted_when_hunk_ends_in_conflict() {
        let mut file = four_hunk_modify();
        file.hunks[1].changes.push(Change {
            kind: ChangeKind::Conflict,
            content: "<<<<<<< b".to_string(),
            old_line_number: None,
            new_line_number: Some(13),
        });
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        assert_eq!(expander.max_expand_bottom_range(1), BottomRange::Exhausted);
    }

    #[test]
    fn test_adjacent_hunks_leave_no_bottom_gap() {
        let mut file = four_hunk_modify();
        file.hunks[2].new_start = Some(13);
        file.hunks[2].old_start = Some(13);
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        // hunk 1 ends at 12, hunk 2 now starts at 13
        assert_eq!(expander.max_expand_bottom_range(1), BottomRange::Exhausted);
    }

    #[tokio::test]
    async fn test_expand_rejects_bad_hunk_index() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        let err = expander.expand_head(4, 10).await.unwrap_err();
        assert!(matches!(err, ExpandError::HunkIndex { index: 4, count: 4 }));
    }

    #[tokio::test]
    async fn test_expand_rejects_missing_lines_link() {
        let mut file = four_hunk_modify();
        file.lines_link = None;
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        let err = expander.expand_head(1, 5).await.unwrap_err();
        assert!(matches!(err, ExpandError::NoLinesLink(_)));
    }

    #[tokio::test]
    async fn test_expand_rejects_empty_range() {
        let file = four_hunk_modify();
        let expander = DiffExpander::new(&file, &NoOpLineFetcher);
        // hunk 0 starts at line 1, nothing above it
        let err = expander.expand_head(0, 10).await.unwrap_err();
        assert!(matches!(err, ExpandError::NothingToExpand(0)));
    }

    /// Records requests and answers with an empty file tail.
    #[derive(Default)]
    struct RecordingFetcher {
        calls: std::sync::Mutex<Vec<(u32, i64)>>,
    }

    #[async_trait::async_trait]
    impl LineFetcher for RecordingFetcher {
        async fn fetch_lines(
            &self,
            _link: &str,
            start: u32,
            end: LineBound,
        ) -> Result<Vec<String>, crate::traits::FetchError> {
            self.calls.lock().unwrap().push((start, end.as_wire()));
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_huge_bottom_count_keeps_line_numbers_representable() {
        let file = four_hunk_modify();
        let fetcher = RecordingFetcher::default();
        let expander = DiffExpander::new(&file, &fetcher);

        // hunk 3 ends at line 31; a count beyond u32 territory must not
        // push the requested end past u32::MAX
        let expanded = expander
            .expand_bottom(3, i64::from(u32::MAX) + 5)
            .await
            .unwrap();

        let calls = fetcher.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(32, i64::from(u32::MAX - 1))]);
        assert!(expanded.hunks[4].fully_expanded);
    }

    #[test]
    fn test_context_hunk_numbers_both_sides() {
        let hunk = context_hunk(5, 8, vec!["a".into(), "b".into()], false);
        assert_eq!(hunk.old_start, Some(5));
        assert_eq!(hunk.new_start, Some(8));
        assert_eq!(hunk.old_lines, 2);
        assert_eq!(hunk.new_lines, 2);
        assert!(!hunk.fully_expanded);
        assert_eq!(hunk.changes[1].kind, ChangeKind::Normal);
        assert_eq!(hunk.changes[1].old_line_number, Some(6));
        assert_eq!(hunk.changes[1].new_line_number, Some(9));
    }
}
