// src/services/rating_presenter.rs
//
// Rating presentation: turns a RatingOutcome into the text, tone and
// tooltip of a row's rating element, and paints it onto the document.

use chrono::{DateTime, Utc};

use crate::document::{Document, NodeId};
use crate::domain::{RatingOutcome, RatingStatus};

pub const RATING_CLASS: &str = "sp-rating";
const TONE_CLASS_PREFIX: &str = "sp-rating--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTone {
    /// Waiting for the first answer
    Pending,
    /// Fetched just now
    Fresh,
    /// Served from cache
    Cached,
    /// Refresh failed, cached value shown
    Fallback,
    /// No score to show
    Missing,
}

impl RatingTone {
    pub fn class_name(&self) -> &'static str {
        match self {
            RatingTone::Pending => "sp-rating--pending",
            RatingTone::Fresh => "sp-rating--fresh",
            RatingTone::Cached => "sp-rating--cached",
            RatingTone::Fallback => "sp-rating--fallback",
            RatingTone::Missing => "sp-rating--missing",
        }
    }

    fn color(&self) -> Option<&'static str> {
        match self {
            RatingTone::Pending => None,
            RatingTone::Fresh => Some("#00cc66"),
            RatingTone::Cached | RatingTone::Fallback => Some("#ff9900"),
            RatingTone::Missing => Some("#999"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingView {
    pub text: String,
    pub tone: RatingTone,
    pub tooltip: String,
}

impl RatingView {
    pub fn from_outcome(outcome: &RatingOutcome, now: DateTime<Utc>) -> Self {
        if outcome.is_pending() {
            return Self {
                text: "…".to_string(),
                tone: RatingTone::Pending,
                tooltip: "Loading rating from AniList".to_string(),
            };
        }

        let Some(score) = outcome.score else {
            let tooltip = if outcome.failed {
                "AniList fetch failed\nClick to retry"
            } else {
                "No score on AniList\nClick to refresh"
            };
            return Self {
                text: "N/A".to_string(),
                tone: RatingTone::Missing,
                tooltip: tooltip.to_string(),
            };
        };

        let text = format!("⭐ {}%", score);
        let remaining = outcome
            .expires_at
            .map(|expires| format_remaining(expires.signed_duration_since(now)))
            .unwrap_or_else(|| format_remaining(chrono::Duration::zero()));

        match (outcome.status, outcome.failed) {
            (RatingStatus::Fresh, _) => Self {
                text,
                tone: RatingTone::Fresh,
                tooltip: "Fresh from AniList\nClick to refresh".to_string(),
            },
            (_, true) => Self {
                text,
                tone: RatingTone::Fallback,
                tooltip: format!(
                    "Refresh failed — showing cached (expires in {})\nClick to retry",
                    remaining
                ),
            },
            (_, false) => Self {
                text,
                tone: RatingTone::Cached,
                tooltip: format!(
                    "Loaded from cache (expires in {})\nClick to refresh",
                    remaining
                ),
            },
        }
    }

    /// Paint the view onto a rating element in place
    pub fn apply(&self, document: &mut Document, rating: NodeId) {
        if !document.is_element(rating) {
            return;
        }
        document.set_text(rating, &self.text);
        document.replace_class_with_prefix(rating, TONE_CLASS_PREFIX, self.tone.class_name());
        document.add_class(rating, RATING_CLASS);
        document.set_attribute(rating, "title", &self.tooltip);
        match self.tone.color() {
            Some(color) => document.set_style_property(rating, "color", color),
            None => document.remove_attribute(rating, "style"),
        }
    }
}

/// "Hh Mm", floored, never negative
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
