// src/services/rating_service.rs
//
// Rating Resolution Service
//
// Composes the rating cache and the rating fetcher with
// stale-while-revalidate semantics:
//
//   fresh entry, not forced  -> cached value, no network
//   absent / stale / forced  -> best known value now, plus ONE background
//                               fetch whose result goes to the cache and to
//                               the caller's presentation callback
//
// CRITICAL RULES:
// - Forced resolutions always hit the network
// - A failed fetch never modifies the cache
// - Simultaneous resolutions of one title are NOT coalesced; each issues
//   its own fetch and the last one to complete wins at the presentation
//   layer. There is no cancellation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::domain::{normalize_title, CacheEntry, CacheLookup, RatingOutcome};
use crate::integrations::RatingFetcher;
use crate::repositories::RatingCacheRepository;

/// What `resolve` hands back immediately
#[derive(Debug)]
pub struct Resolution {
    /// Normalized title used for cache and lookup
    pub key: String,
    /// Best currently-known value
    pub current: RatingOutcome,
    /// Background refresh, when one was started
    pub refresh: Option<JoinHandle<RatingOutcome>>,
}

pub struct RatingResolutionService {
    cache: Arc<dyn RatingCacheRepository>,
    fetcher: Arc<dyn RatingFetcher>,
    ttl: Duration,
}

impl RatingResolutionService {
    pub fn new(
        cache: Arc<dyn RatingCacheRepository>,
        fetcher: Arc<dyn RatingFetcher>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            fetcher,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Classify the cached rating for a display title
    pub fn lookup(&self, title: &str) -> CacheLookup {
        let key = normalize_title(title);
        CacheLookup::classify(self.cache.get(&key), Utc::now(), self.ttl)
    }

    /// Resolve the rating for a display title.
    ///
    /// Returns the current value right away. When a refresh is needed it is
    /// spawned on the tokio runtime; on completion `on_update` receives the
    /// refreshed (or degraded) value. Must be called from within a runtime.
    pub fn resolve<F>(self: &Arc<Self>, title: &str, force_refresh: bool, on_update: F) -> Resolution
    where
        F: FnOnce(RatingOutcome) + Send + 'static,
    {
        let key = normalize_title(title);

        if key.is_empty() {
            debug!("Title {:?} normalizes to nothing; skipping rating lookup", title);
            return Resolution {
                key,
                current: RatingOutcome::failed_without_cache(),
                refresh: None,
            };
        }

        let lookup = CacheLookup::classify(self.cache.get(&key), Utc::now(), self.ttl);

        if let (false, CacheLookup::Fresh(entry)) = (force_refresh, lookup) {
            debug!("Rating cache hit for '{}'", key);
            return Resolution {
                key,
                current: RatingOutcome::cached(entry, self.ttl),
                refresh: None,
            };
        }

        let current = match lookup.entry() {
            Some(entry) => RatingOutcome::cached(entry, self.ttl),
            None => RatingOutcome::pending(),
        };

        debug!(
            "Refreshing rating for '{}' ({:?}, forced: {})",
            key, lookup, force_refresh
        );

        let service = Arc::clone(self);
        let task_key = key.clone();
        let refresh = tokio::spawn(async move {
            let outcome = service.refresh(&task_key).await;
            on_update(outcome);
            outcome
        });

        Resolution {
            key,
            current,
            refresh: Some(refresh),
        }
    }

    /// Perform one fetch for a normalized title and apply it to the cache.
    ///
    /// Success overwrites the cache entry (a missing score included).
    /// Failure leaves the cache alone and degrades to the cached value,
    /// flagged as failed.
    pub async fn refresh(&self, key: &str) -> RatingOutcome {
        match self.fetcher.fetch_score(key).await {
            Ok(score) => {
                let entry = CacheEntry::new(score, Utc::now());
                if let Err(e) = self.cache.put(key, entry) {
                    warn!("Could not persist rating for '{}': {}", key, e);
                }
                RatingOutcome::fresh(entry, self.ttl)
            }
            Err(failure) => {
                warn!("Rating refresh for '{}' failed: {}", key, failure);
                match self.cache.get(key) {
                    Some(entry) => RatingOutcome::failed_with_cache(entry, self.ttl),
                    None => RatingOutcome::failed_without_cache(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RatingStatus, DEFAULT_RATING_TTL_HOURS};
    use crate::integrations::{FetchFailure, MockRatingFetcher};
    use crate::repositories::{BlobRatingCacheRepository, BlobStore, MemoryBlobStore};
    use std::sync::Mutex;

    fn ttl() -> Duration {
        Duration::hours(DEFAULT_RATING_TTL_HOURS)
    }

    fn service_with(
        fetcher: MockRatingFetcher,
    ) -> (Arc<RatingResolutionService>, Arc<BlobRatingCacheRepository>) {
        let cache = Arc::new(BlobRatingCacheRepository::new(Arc::new(MemoryBlobStore::new())));
        let service = Arc::new(RatingResolutionService::new(
            cache.clone(),
            Arc::new(fetcher),
            ttl(),
        ));
        (service, cache)
    }

    #[tokio::test]
    async fn test_empty_cache_fetches_once_and_stores_score() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher
            .expect_fetch_score()
            .withf(|title| title == "Show Name")
            .times(1)
            .returning(|_| Ok(Some(82)));
        let (service, cache) = service_with(fetcher);

        let before = Utc::now();
        let resolution = service.resolve("Show Name — 01", false, |_| {});
        assert!(resolution.current.is_pending());

        let refreshed = resolution.refresh.unwrap().await.unwrap();
        let after = Utc::now();

        assert_eq!(refreshed.score, Some(82));
        assert_eq!(refreshed.status, RatingStatus::Fresh);
        assert!(!refreshed.failed);

        let entry = cache.get("Show Name").unwrap();
        assert_eq!(entry.score, Some(82));
        assert!(entry.fetched_at >= before && entry.fetched_at <= after);
    }

    #[tokio::test]
    async fn test_fresh_entry_skips_network() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(0);
        let (service, cache) = service_with(fetcher);

        let entry = CacheEntry::new(Some(75), Utc::now() - Duration::hours(2));
        cache.put("Show Name", entry).unwrap();

        let resolution = service.resolve("Show Name - 03", false, |_| {
            panic!("no refresh expected")
        });

        assert!(resolution.refresh.is_none());
        assert_eq!(resolution.current, RatingOutcome::cached(entry, ttl()));
    }

    #[tokio::test]
    async fn test_forced_refresh_hits_network_even_when_fresh() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(1).returning(|_| Ok(Some(90)));
        let (service, cache) = service_with(fetcher);

        cache
            .put("Show Name", CacheEntry::new(Some(75), Utc::now()))
            .unwrap();

        let resolution = service.resolve("Show Name", true, |_| {});
        assert_eq!(resolution.current.score, Some(75));

        let refreshed = resolution.refresh.unwrap().await.unwrap();
        assert_eq!(refreshed.score, Some(90));
        assert_eq!(cache.get("Show Name").unwrap().score, Some(90));
    }

    #[tokio::test]
    async fn test_stale_entry_failure_keeps_cache_and_flags_failed() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher
            .expect_fetch_score()
            .times(1)
            .returning(|_| Err(FetchFailure::Network("connection reset".to_string())));
        let (service, cache) = service_with(fetcher);

        let stale = CacheEntry::new(Some(64), Utc::now() - Duration::hours(7));
        cache.put("Show Name", stale).unwrap();

        let resolution = service.resolve("Show Name (Batch)", false, |_| {});
        assert_eq!(resolution.current, RatingOutcome::cached(stale, ttl()));

        let refreshed = resolution.refresh.unwrap().await.unwrap();
        assert_eq!(refreshed.score, Some(64));
        assert!(refreshed.failed);
        assert_eq!(cache.get("Show Name"), Some(stale));
    }

    #[tokio::test]
    async fn test_failure_without_cache_reports_no_score() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher
            .expect_fetch_score()
            .returning(|_| Err(FetchFailure::Status(503)));
        let (service, cache) = service_with(fetcher);

        let refreshed = service.refresh("Show Name").await;

        assert_eq!(refreshed, RatingOutcome::failed_without_cache());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_score_is_cached_as_null() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(1).returning(|_| Ok(None));
        let (service, cache) = service_with(fetcher);

        let refreshed = service.refresh("Unknown Show").await;
        assert_eq!(refreshed.score, None);
        assert!(!refreshed.failed);

        let entry = cache.get("Unknown Show").unwrap();
        assert_eq!(entry.score, None);

        // The null entry is fresh: no second fetch
        assert!(matches!(service.lookup("Unknown Show"), CacheLookup::Fresh(_)));
    }

    #[tokio::test]
    async fn test_callback_receives_refreshed_value() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().returning(|_| Ok(Some(88)));
        let (service, _cache) = service_with(fetcher);

        let delivered = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&delivered);
        let resolution = service.resolve("Show Name", false, move |outcome| {
            *sink.lock().unwrap() = Some(outcome);
        });
        resolution.refresh.unwrap().await.unwrap();

        let outcome = delivered.lock().unwrap().unwrap();
        assert_eq!(outcome.score, Some(88));
        assert_eq!(outcome.status, RatingStatus::Fresh);
    }

    #[tokio::test]
    async fn test_simultaneous_resolutions_are_not_coalesced() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(2).returning(|_| Ok(Some(70)));
        let (service, _cache) = service_with(fetcher);

        let first = service.resolve("Show Name - 01", false, |_| {});
        let second = service.resolve("Show Name - 02", false, |_| {});

        first.refresh.unwrap().await.unwrap();
        second.refresh.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_key_never_fetches() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(0);
        let (service, _cache) = service_with(fetcher);

        let resolution = service.resolve("- 05", false, |_| {});
        assert!(resolution.refresh.is_none());
        assert_eq!(resolution.current.score, None);
        assert_eq!(resolution.key, "");
    }

    #[tokio::test]
    async fn test_far_future_cache_entry_is_refreshed() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher
            .expect_fetch_score()
            .withf(|title| title == "Show")
            .times(1)
            .returning(|_| Ok(Some(64)));

        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .write(
                crate::repositories::RATING_CACHE_BLOB,
                r#"{"Show":{"score":80,"timestamp":8210266876799999}}"#,
            )
            .unwrap();
        let cache = Arc::new(BlobRatingCacheRepository::new(blobs));
        let service = Arc::new(RatingResolutionService::new(
            cache.clone(),
            Arc::new(fetcher),
            ttl(),
        ));

        let resolution = service.resolve("Show - 01", false, |_| {});
        assert_eq!(resolution.current.score, Some(80));
        assert_eq!(resolution.current.expires_at, None);

        let refreshed = resolution.refresh.unwrap().await.unwrap();
        assert_eq!(refreshed.score, Some(64));
        assert!(cache.get("Show").unwrap().fetched_at <= Utc::now());
    }
}
