//! Trait for fetching raw file lines for context expansion.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when fetching lines.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("line request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend answered {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The resolved request URL.
        url: String,
    },

    /// No line source is available for this file.
    #[error("line source unavailable: {0}")]
    Unavailable(String),
}

/// Inclusive upper bound of a line-range request.
///
/// The wire protocol encodes "through end of file" as `-1`; that sentinel
/// stays at the URL edge and the rest of the code works with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBound {
    /// 1-based inclusive last line.
    Line(u32),
    /// Through the end of the file.
    Eof,
}

impl LineBound {
    /// Numeric form used in the `{end}` URL placeholder.
    pub fn as_wire(&self) -> i64 {
        match self {
            LineBound::Line(n) => i64::from(*n),
            LineBound::Eof => -1,
        }
    }
}

/// Provides raw file content for context expansion.
///
/// Implement this trait to let [`DiffExpander`](crate::expand::DiffExpander)
/// fetch lines of the new revision beyond what the diff hunks carry.
///
/// Implementations return lines already split and stripped of any trailing
/// newline artifact; [`split_payload`] does exactly that for a raw text body.
#[async_trait]
pub trait LineFetcher: Send + Sync {
    /// Fetch a line range from the file behind `link`.
    ///
    /// # Arguments
    /// * `link` - URL template with `{start}` and `{end}` placeholders
    /// * `start` - 1-indexed first line (inclusive)
    /// * `end` - inclusive upper bound, possibly [`LineBound::Eof`]
    ///
    /// # Returns
    /// The requested lines without newline characters. Fewer lines than
    /// requested means the file ended inside the range.
    async fn fetch_lines(
        &self,
        link: &str,
        start: u32,
        end: LineBound,
    ) -> Result<Vec<String>, FetchError>;
}

/// A no-op fetcher for when context expansion is disabled.
pub struct NoOpLineFetcher;

#[async_trait]
impl LineFetcher for NoOpLineFetcher {
    async fn fetch_lines(
        &self,
        _link: &str,
        _start: u32,
        _end: LineBound,
    ) -> Result<Vec<String>, FetchError> {
        Err(FetchError::Unavailable(
            "context expansion is disabled".to_string(),
        ))
    }
}

/// Split a raw text payload into lines.
///
/// Lines are split on `\n`; the empty trailing segment produced by a final
/// newline is discarded so the line count matches the source file.
pub fn split_payload(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(String::from).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_payload_trailing_newline() {
        assert_eq!(split_payload("a\nb\nc\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_payload_without_trailing_newline() {
        assert_eq!(split_payload("a\nb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_payload_empty() {
        assert_eq!(split_payload(""), Vec::<String>::new());
    }

    #[test]
    fn test_split_payload_keeps_blank_lines() {
        // Only the final newline artifact is dropped.
        assert_eq!(split_payload("a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_line_bound_wire_encoding() {
        assert_eq!(LineBound::Line(42).as_wire(), 42);
        assert_eq!(LineBound::Eof.as_wire(), -1);
    }

    #[tokio::test]
    async fn test_noop_fetcher_is_unavailable() {
        let fetcher = NoOpLineFetcher;
        let result = fetcher.fetch_lines("http://example", 1, LineBound::Eof).await;
        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }
}
