use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug pattern"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("valid separator pattern"));

/// Turns a post title into the identifier used in `/post/{slug}` links.
///
/// Strips everything except word characters, whitespace and hyphens, trims,
/// lowercases, then folds each run of whitespace, underscores or hyphens into
/// a single `-`.
pub fn slugify(text: &str) -> String {
    let cleaned = DISALLOWED.replace_all(text, "");
    let lowered = cleaned.trim().to_lowercase();
    SEPARATORS.replace_all(&lowered, "-").into_owned()
}
