// src/application/state.rs

use std::sync::Arc;

use log::info;
use tokio::task::JoinHandle;

use crate::config::EnricherConfig;
use crate::db::{
    create_connection_pool, get_connection, get_database_path, initialize_database,
    verify_database_integrity,
};
use crate::document::{shared, Document};
use crate::error::AppResult;
use crate::integrations::{AniListClient, RatingFetcher};
use crate::repositories::{
    BlobPreferenceStore, BlobRatingCacheRepository, BlobStore, FavoritesStore, PreferenceStore,
    RatingCacheRepository, SqliteBlobStore,
};
use crate::services::{spawn_change_scheduler, RatingResolutionService, RowEnricher};

/// Application state shared by every command.
/// All fields are Arc-wrapped; the enricher owns the live document.
pub struct AppState {
    pub config: EnricherConfig,
    pub rating_cache: Arc<dyn RatingCacheRepository>,
    pub favorites: Arc<FavoritesStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub ratings: Arc<RatingResolutionService>,
    pub enricher: Arc<RowEnricher>,
}

impl AppState {
    /// Wire stores, services and an empty document together
    pub fn new(
        config: EnricherConfig,
        blob_store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn RatingFetcher>,
    ) -> Self {
        let rating_cache: Arc<dyn RatingCacheRepository> =
            Arc::new(BlobRatingCacheRepository::new(blob_store.clone()));
        let favorites = Arc::new(FavoritesStore::new(blob_store.clone()));
        let preferences: Arc<dyn PreferenceStore> =
            Arc::new(BlobPreferenceStore::new(blob_store));

        let ratings = Arc::new(RatingResolutionService::new(
            rating_cache.clone(),
            fetcher,
            config.rating_ttl(),
        ));

        let enricher = Arc::new(RowEnricher::new(
            shared(Document::new()),
            ratings.clone(),
            favorites.clone(),
            preferences.clone(),
            config.host_layout(),
        ));

        Self {
            config,
            rating_cache,
            favorites,
            preferences,
            ratings,
            enricher,
        }
    }

    /// Production wiring: SQLite blob store and the AniList client
    pub fn open(config: EnricherConfig) -> AppResult<Self> {
        let blob_store = Self::open_blob_store(&config)?;
        let fetcher: Arc<dyn RatingFetcher> = Arc::new(AniListClient::with_settings(
            &config.anilist_endpoint,
            config.request_timeout(),
            config.min_request_interval(),
        )?);
        Ok(Self::new(config, blob_store, fetcher))
    }

    /// Open (creating if needed) the SQLite blob store named by the config
    pub fn open_blob_store(config: &EnricherConfig) -> AppResult<Arc<dyn BlobStore>> {
        let path = match &config.database_path {
            Some(path) => path.clone(),
            None => get_database_path()?,
        };
        let pool = Arc::new(create_connection_pool(&path)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
            verify_database_integrity(&conn)?;
        }
        info!("Using database at {}", path.display());
        Ok(Arc::new(SqliteBlobStore::new(pool)))
    }

    /// Start the change scheduler over the enricher's document
    pub fn start_watching(&self) -> JoinHandle<()> {
        spawn_change_scheduler(self.enricher.clone(), self.config.debounce())
    }
}
