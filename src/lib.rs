// src/lib.rs
// Release Enricher - rating, thumbnail and favorite enrichment for release listings
//
// Architecture:
// - Domain-centric: title normalization and rating freshness rules live in domain
// - Change-driven: a debounced scheduler reacts to document mutations
// - Cache-first: ratings are served stale-while-revalidate from a local blob cache
// - Explicit: every row is enriched exactly once, marked before any async work

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod document;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    normalize_image_size,
    normalize_title,
    parse_image_size,
    validate_favorite_key,
    validate_preference_name,
    CacheEntry,
    CacheLookup,
    DomainError,
    FavoriteEntry,
    RatingOutcome,
    RatingStatus,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration
// ============================================================================

pub use config::EnricherConfig;

// ============================================================================
// PUBLIC API - Document
// ============================================================================

pub use document::{Document, HostRelease, MutationRecord, NodeId, SharedDocument};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    BlobPreferenceStore,
    BlobRatingCacheRepository,
    BlobStore,
    FavoritesStore,
    MemoryBlobStore,
    PreferenceStore,
    RatingCacheRepository,
    SqliteBlobStore,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    spawn_change_scheduler,
    ChangeScheduler,
    Debouncer,
    HostLayout,
    RatingResolutionService,
    RatingView,
    Resolution,
    RowEnricher,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{AniListClient, FetchFailure, RatingFetcher};
