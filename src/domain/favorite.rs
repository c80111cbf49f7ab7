// src/domain/favorite.rs
//
// Favorite Entity
//
// CRITICAL INVARIANTS:
// - Presence of the key <=> the title is favorited
// - There is no "unfavorited but remembered" state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// A favorited release, keyed by normalized title in the favorites store.
///
/// Serialized as `{"originalTitle": str, "timestamp": epoch-ms}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Title as it was displayed when the user marked it
    #[serde(rename = "originalTitle")]
    pub original_title: String,

    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub marked_at: DateTime<Utc>,
}

impl FavoriteEntry {
    pub fn new(original_title: impl Into<String>) -> Self {
        Self {
            original_title: original_title.into(),
            marked_at: Utc::now(),
        }
    }
}

/// Validates that a normalized key can identify a favorite
pub fn validate_favorite_key(key: &str) -> DomainResult<()> {
    if key.is_empty() {
        return Err(DomainError::InvariantViolation(
            "Favorite title normalizes to an empty key".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_original_title_and_timestamp() {
        let entry = FavoriteEntry {
            original_title: "Frieren — 05".to_string(),
            marked_at: DateTime::from_timestamp_millis(1_000).unwrap(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"originalTitle": "Frieren — 05", "timestamp": 1000})
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(validate_favorite_key("").is_err());
        assert!(validate_favorite_key("Frieren").is_ok());
    }
}
