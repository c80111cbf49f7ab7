// src/domain/title.rs
//
// Title Normalization
//
// Maps a displayed release title ("Show — 05", "Show (Batch)", "Show - 01-12")
// to the canonical key shared by the rating cache and the favorites store.
//
// CRITICAL RULES:
// - Pure: no I/O, no state
// - Idempotent: normalize_title(normalize_title(x)) == normalize_title(x)
// - May return an empty string for pathological input; callers must cope

use regex::Regex;
use std::sync::LazyLock;

/// Trailing "(Batch)" marker, any case
static BATCH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\s*batch\s*\)\s*$").expect("batch suffix pattern is valid")
});

/// Trailing episode marker: "- 05", "— 05", "– 05v2", "- 12.5" or a range "- 01-12".
/// The range joiner is a bare hyphen.
static EPISODE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[-–—]\s*\d+(?:\.\d+)?(?:v\d+)?(?:-\d+(?:\.\d+)?(?:v\d+)?)?\s*$")
        .expect("episode suffix pattern is valid")
});

/// Normalize a raw display title into a lookup key.
///
/// Strips, in order, a trailing `(Batch)` marker, a trailing episode marker
/// or episode range, and surrounding whitespace. The sequence is repeated
/// until nothing changes, so "Show - 01-12 (Batch)" and "Show (Batch) - 03"
/// both reduce to "Show".
pub fn normalize_title(raw: &str) -> String {
    let mut current = raw.trim().to_string();

    loop {
        let without_batch = BATCH_SUFFIX.replace(&current, "");
        let without_episode = EPISODE_SUFFIX.replace(&without_batch, "");
        let next = without_episode.trim().to_string();

        if next == current {
            return next;
        }
        current = next;
    }
}
