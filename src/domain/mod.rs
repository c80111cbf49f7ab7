// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod favorite;
pub mod preference;
pub mod rating;
pub mod title;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Title normalization
pub use title::normalize_title;

// Ratings
pub use rating::{CacheEntry, CacheLookup, RatingOutcome, RatingStatus, DEFAULT_RATING_TTL_HOURS};

// Favorites
pub use favorite::{validate_favorite_key, FavoriteEntry};

// Preferences
pub use preference::{normalize_image_size, parse_image_size, validate_preference_name};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
