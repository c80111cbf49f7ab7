// src/repositories/rating_cache_repository.rs
//
// Rating Cache Store
//
// normalized title -> CacheEntry, persisted as the single `ratingCache` blob.
//
// CRITICAL RULES:
// - Every put re-reads the latest blob right before writing, so a refresh
//   for one title never clobbers an entry written meanwhile for another
// - A corrupt blob reads as empty and is overwritten by the next put
// - No eviction

use std::sync::Arc;

use crate::domain::CacheEntry;
use crate::error::AppResult;
use crate::repositories::blob_store::{load_map, save_map, BlobStore};

/// Blob name of the persisted rating cache
pub const RATING_CACHE_BLOB: &str = "ratingCache";

pub trait RatingCacheRepository: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn put(&self, key: &str, entry: CacheEntry) -> AppResult<()>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct BlobRatingCacheRepository {
    store: Arc<dyn BlobStore>,
}

impl BlobRatingCacheRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }
}

impl RatingCacheRepository for BlobRatingCacheRepository {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        load_map::<CacheEntry>(self.store.as_ref(), RATING_CACHE_BLOB).remove(key)
    }

    fn put(&self, key: &str, entry: CacheEntry) -> AppResult<()> {
        let mut entries = load_map::<CacheEntry>(self.store.as_ref(), RATING_CACHE_BLOB);
        entries.insert(key.to_string(), entry);
        save_map(self.store.as_ref(), RATING_CACHE_BLOB, &entries)
    }

    fn len(&self) -> usize {
        load_map::<CacheEntry>(self.store.as_ref(), RATING_CACHE_BLOB).len()
    }
}
