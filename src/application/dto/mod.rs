// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are output-friendly representations
// - DTOs are simple, serializable structs
// - Conversion FROM domain values only (never TO)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FavoriteEntry, RatingOutcome, RatingStatus};
use crate::services::RatingView;

// ============================================================================
// RATING DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDto {
    pub key: String,
    pub score: Option<u32>,
    pub status: String,
    pub failed: bool,
    pub expires_at: Option<String>,
    pub display: String,
    pub tooltip: String,
}

impl RatingDto {
    pub fn from_outcome(key: &str, outcome: &RatingOutcome, now: DateTime<Utc>) -> Self {
        let view = RatingView::from_outcome(outcome, now);
        let status = match outcome.status {
            RatingStatus::Pending => "pending",
            RatingStatus::Fresh => "fresh",
            RatingStatus::Cached => "cached",
        };

        Self {
            key: key.to_string(),
            score: outcome.score,
            status: status.to_string(),
            failed: outcome.failed,
            expires_at: outcome.expires_at.map(|t| t.to_rfc3339()),
            display: view.text,
            tooltip: view.tooltip,
        }
    }
}

// ============================================================================
// FAVORITE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDto {
    pub key: String,
    pub original_title: String,
    pub marked_at: String,
}

impl From<(String, FavoriteEntry)> for FavoriteDto {
    fn from((key, entry): (String, FavoriteEntry)) -> Self {
        Self {
            key,
            original_title: entry.original_title,
            marked_at: entry.marked_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteToggleDto {
    pub key: String,
    pub is_favorite: bool,
}

// ============================================================================
// PREFERENCE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceDto {
    pub name: String,
    pub value: String,
}

// ============================================================================
// ENRICHMENT DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentReportDto {
    pub rows: usize,
    pub enriched: usize,
    pub html: String,
}
