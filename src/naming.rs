//! Centralized tag normalization and display naming.
//!
//! Tags arrive from many places: catalog records, the filter pills, the
//! landing tag of a tag page, and JSON payloads from the channel boundary.
//! They all pass through [`normalize_tag`] so that `" Street "`, `"STREET"`
//! and `"street"` are the same tag everywhere.
//!
//! ## Display Labels
//!
//! Normalization only trims and lowercases; the inner text of a tag is kept
//! as written. Dashes are converted to spaces for display:
//! - `black-and-white` → "black and white"
//! - `night` → "night"

use std::collections::BTreeSet;

/// Normalize a single tag: trimmed and lowercase. Returns `None` for tags
/// that are empty after trimming.
///
/// - `" Street "` → `Some("street")`
/// - `"Black and White"` → `Some("black and white")`
/// - `"   "` → `None`
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

/// Normalize a collection of raw tags into a set. Empty tags are dropped and
/// duplicates collapse.
pub fn normalize_tags<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .collect()
}

/// Display label for a normalized tag: dashes become spaces.
pub fn tag_label(tag: &str) -> String {
    tag.replace('-', " ")
}

const MAX_SLUG_LEN: usize = 80;

/// Sanitize a tag for use in a tag page URL.
///
/// - Replaces non-alphanumeric characters (except dashes) with dashes
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn tag_slug(tag: &str) -> String {
    let mut slug = String::with_capacity(tag.len());
    let mut prev_dash = false;
    for c in tag.chars() {
        let c = if c.is_ascii_alphanumeric() {
            c.to_ascii_lowercase()
        } else {
            '-'
        };
        if c == '-' {
            if !prev_dash {
                slug.push('-');
            }
            prev_dash = true;
        } else {
            slug.push(c);
            prev_dash = false;
        }
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}
