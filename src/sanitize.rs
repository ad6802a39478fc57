//! Cleanup of provider output down to a bare SQL statement.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?i)```(?:sql)?\n?").unwrap();
    static ref COMMENT_LINE: Regex = Regex::new(r"(?m)^[^\S\n]*--.*(?:\n|$)").unwrap();
}

/// Strip markdown fences and `--` comment lines, then trim.
pub fn sanitize_sql(raw: &str) -> String {
    let mut text = raw.to_string();
    // Removing a fence can butt leftover backticks together into a new one.
    while CODE_FENCE.is_match(&text) {
        text = CODE_FENCE.replace_all(&text, "").into_owned();
    }
    let text = COMMENT_LINE.replace_all(&text, "");
    text.trim().to_string()
}
