//! Data models for diff representation.

mod diff;

pub use diff::{Change, ChangeKind, FileDiff, FileKind, Hunk};
