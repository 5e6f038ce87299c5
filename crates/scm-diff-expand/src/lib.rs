//! # scm-diff-expand
//!
//! Diff model and lazy context-line expansion for SCM diff views.
//!
//! The crate owns three things:
//!
//! - an immutable diff model ([`FileDiff`], [`Hunk`], [`Change`]),
//! - a parser from unified diff text into that model,
//! - the [`DiffExpander`], which computes how much context remains
//!   around each hunk boundary and fetches it on demand through a
//!   [`LineFetcher`], producing a new `FileDiff` on every expansion.
//!
//! ## Design Principles
//!
//! The expander is **instrumented** — it never talks to a backend
//! directly but goes through the [`LineFetcher`] trait. This enables:
//!
//! - Testability without mocking HTTP clients
//! - Reusability against any line source (HAL endpoint, local file, git)
//! - Clear separation between range math and transport
//!
//! Every command returns a *new* `FileDiff`; the one a view currently
//! renders stays valid even when a fetch fails, so the same expansion
//! can simply be retried.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scm_diff_expand::{parse_unified_diff, DiffExpander};
//!
//! let files = parse_unified_diff(diff_text)?;
//! let file = files[0].clone().with_lines_link(lines_href);
//!
//! let expander = DiffExpander::new(&file, &fetcher);
//! if expander.max_expand_head_range(1) > 0 {
//!     let expanded = expander.expand_head(1, 10).await?;
//!     // re-render with `expanded`
//! }
//! ```

pub mod expand;
pub mod model;
pub mod parser;
pub mod traits;

// Re-export commonly used types
pub use expand::{BottomRange, DiffExpander, ExpandError};
pub use model::{Change, ChangeKind, FileDiff, FileKind, Hunk};
pub use parser::{parse_unified_diff, ParseError};
pub use traits::{split_payload, FetchError, LineBound, LineFetcher, NoOpLineFetcher};
