//! HAL `_links` types and line-range URL templates.

use scm_diff_expand::LineBound;
use serde::Deserialize;
use std::collections::HashMap;

/// One HAL link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    /// Target URL, possibly a template.
    pub href: String,
    /// Whether `href` contains placeholders.
    #[serde(default)]
    pub templated: bool,
}

/// The `_links` object of a HAL resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(flatten)]
    entries: HashMap<String, Link>,
}

impl Links {
    /// Look up a link by relation name.
    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.entries.get(rel)
    }

    /// The `lines` link template, if the backend offers line fetching
    /// for this file.
    pub fn lines_href(&self) -> Option<&str> {
        self.get("lines").map(|link| link.href.as_str())
    }
}

/// Resolve a line-range URL template.
///
/// `{start}` and `{end}` are 1-based and inclusive; [`LineBound::Eof`]
/// renders as `-1`, the wire sentinel for "through end of file".
pub fn resolve_line_range(template: &str, start: u32, end: LineBound) -> String {
    template
        .replace("{start}", &start.to_string())
        .replace("{end}", &end.as_wire().to_string())
}
