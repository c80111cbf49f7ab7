// src/domain/preference.rs
//
// Display preferences consumed by row rendering.
// Storage belongs to the preference collaborator; this module only knows the
// recognized names and how to canonicalize their values.

use crate::domain::{DomainError, DomainResult};

/// Thumbnail width preference, canonical form "<digits>px"
pub const IMAGE_SIZE: &str = "imageSize";

/// Free-form padding preference (advisory only)
pub const PADDING: &str = "padding";

pub const DEFAULT_IMAGE_SIZE: &str = "64px";

/// Sizes offered by a settings surface
pub const IMAGE_SIZE_CHOICES: [(&str, &str); 3] = [
    ("Small (64px)", "64px"),
    ("Medium (128px)", "128px"),
    ("Large (256px)", "256px"),
];

/// Canonicalize a stored image size.
///
/// "64" and "64px" (surrounding whitespace ignored) become "64px"; anything
/// else falls back to the default.
pub fn normalize_image_size(raw: &str) -> String {
    parse_image_size(raw).unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string())
}

/// Canonical "<digits>px" form of `raw`, if it is a pixel size at all
pub fn parse_image_size(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed);

    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(format!("{}px", digits))
    } else {
        None
    }
}

/// Validates that a preference name is one the pipeline recognizes
pub fn validate_preference_name(name: &str) -> DomainResult<()> {
    match name {
        IMAGE_SIZE | PADDING => Ok(()),
        other => Err(DomainError::InvariantViolation(format!(
            "Unknown preference: {}",
            other
        ))),
    }
}
