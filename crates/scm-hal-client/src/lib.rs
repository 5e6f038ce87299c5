//! # scm-hal-client
//!
//! HAL link handling and the HTTP [`LineFetcher`] implementation for
//! [`scm-diff-expand`](scm_diff_expand).
//!
//! The backend exposes, per diff file, a `lines` link whose `href` is a
//! URL template with `{start}` and `{end}` placeholders. This crate
//! resolves such templates and fetches the raw text behind them:
//!
//! ```rust,ignore
//! use scm_diff_expand::DiffExpander;
//! use scm_hal_client::{HalLineClient, Links};
//!
//! let links: Links = serde_json::from_value(resource["_links"].clone())?;
//! let file = file.with_lines_link(links.lines_href().unwrap());
//!
//! let client = HalLineClient::new();
//! let expander = DiffExpander::new(&file, &client);
//! let expanded = expander.expand_bottom(3, -1).await?;
//! ```

pub mod client;
pub mod links;

pub use client::HalLineClient;
pub use links::{resolve_line_range, Link, Links};

// Re-export the fetcher seam so consumers don't need scm-diff-expand
// just to name the trait.
pub use scm_diff_expand::{FetchError, LineBound, LineFetcher};
