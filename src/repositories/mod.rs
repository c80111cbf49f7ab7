// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers over the blob substrate
// - NO rating or freshness logic
// - NO cross-repository calls

pub mod blob_store;
pub mod favorites_repository;
pub mod preference_repository;
pub mod rating_cache_repository;
pub mod sqlite;

pub use blob_store::{load_map, save_map, BlobStore, MemoryBlobStore};
pub use favorites_repository::{FavoritesStore, FAVORITES_BLOB};
pub use preference_repository::{BlobPreferenceStore, PreferenceStore, PREFERENCES_BLOB};
pub use rating_cache_repository::{
    BlobRatingCacheRepository, RatingCacheRepository, RATING_CACHE_BLOB,
};
pub use sqlite::SqliteBlobStore;
