//! Cell text normalization.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Line breaks, tabs, carriage returns and spaces, in runs.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n]+").expect("valid whitespace pattern"));

/// Normalize text returned by a text-layer query for one cell.
///
/// Every run of `\n`, `\t`, `\r` and spaces becomes a single space. Other
/// characters (including leading/trailing content) are left untouched, and
/// applying the function to its own output returns the same string.
pub fn normalize_cell_text(text: &str) -> Cow<'_, str> {
    if !needs_normalizing(text) {
        return Cow::Borrowed(text);
    }
    WHITESPACE_RUN.replace_all(text, " ")
}

fn needs_normalizing(text: &str) -> bool {
    text.contains(['\t', '\r', '\n']) || text.contains("  ")
}
