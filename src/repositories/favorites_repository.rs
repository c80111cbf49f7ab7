// src/repositories/favorites_repository.rs
//
// Favorites Store
//
// Set of normalized titles (with the title as first displayed), persisted as
// the single `favorites` blob. All operations normalize the title they are
// given. Clearing is destructive; confirming it is the caller's job.

use std::sync::Arc;

use log::debug;

use crate::domain::{normalize_title, validate_favorite_key, FavoriteEntry};
use crate::error::AppResult;
use crate::repositories::blob_store::{load_map, save_map, BlobStore};

/// Blob name of the persisted favorites set
pub const FAVORITES_BLOB: &str = "favorites";

pub struct FavoritesStore {
    store: Arc<dyn BlobStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn is_favorite(&self, title: &str) -> bool {
        let key = normalize_title(title);
        load_map::<FavoriteEntry>(self.store.as_ref(), FAVORITES_BLOB).contains_key(&key)
    }

    /// Flip the favorite state of `title`; returns the new state
    pub fn toggle(&self, title: &str) -> AppResult<bool> {
        let key = normalize_title(title);
        validate_favorite_key(&key)?;

        let mut entries = load_map::<FavoriteEntry>(self.store.as_ref(), FAVORITES_BLOB);
        let now_favorite = if entries.remove(&key).is_some() {
            false
        } else {
            entries.insert(key.clone(), FavoriteEntry::new(title.trim()));
            true
        };

        save_map(self.store.as_ref(), FAVORITES_BLOB, &entries)?;
        debug!("Favorite '{}' -> {}", key, now_favorite);
        Ok(now_favorite)
    }

    pub fn get(&self, title: &str) -> Option<FavoriteEntry> {
        let key = normalize_title(title);
        load_map::<FavoriteEntry>(self.store.as_ref(), FAVORITES_BLOB).remove(&key)
    }

    /// All favorites ordered by key
    pub fn list(&self) -> Vec<(String, FavoriteEntry)> {
        load_map::<FavoriteEntry>(self.store.as_ref(), FAVORITES_BLOB)
            .into_iter()
            .collect()
    }

    pub fn clear_all(&self) -> AppResult<()> {
        self.store.delete(FAVORITES_BLOB)
    }
}
