// src/domain/rating.rs
//
// Rating Value Objects
//
// CacheEntry is what the rating cache remembers per normalized title.
// RatingOutcome is what the resolution service hands to presentation.
//
// CRITICAL INVARIANTS:
// - A cached `score: None` means "looked up, nothing found"; it is NOT the
//   same as having no entry at all
// - Freshness is decided only by entry age against the TTL

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default rating time-to-live
pub const DEFAULT_RATING_TTL_HOURS: i64 = 6;

/// Cached rating for one normalized title.
///
/// Serialized as `{"score": int|null, "timestamp": epoch-ms}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub score: Option<u32>,

    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(score: Option<u32>, fetched_at: DateTime<Utc>) -> Self {
        Self { score, fetched_at }
    }

    /// None when the expiry falls outside the representable range
    pub fn expires_at(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        self.fetched_at.checked_add_signed(ttl)
    }

    /// Fresh while strictly younger than the TTL. An entry stamped in the
    /// future has no trustworthy age and counts as stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.fetched_at <= now && now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Result of looking a title up in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Never cached
    Absent,
    /// Age < TTL
    Fresh(CacheEntry),
    /// Age >= TTL
    Stale(CacheEntry),
}

impl CacheLookup {
    pub fn classify(entry: Option<CacheEntry>, now: DateTime<Utc>, ttl: Duration) -> Self {
        match entry {
            None => CacheLookup::Absent,
            Some(entry) if entry.is_fresh(now, ttl) => CacheLookup::Fresh(entry),
            Some(entry) => CacheLookup::Stale(entry),
        }
    }

    pub fn entry(&self) -> Option<CacheEntry> {
        match self {
            CacheLookup::Absent => None,
            CacheLookup::Fresh(entry) | CacheLookup::Stale(entry) => Some(*entry),
        }
    }
}

/// Where the value in a RatingOutcome came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingStatus {
    /// Nothing known yet; a refresh is in flight
    Pending,
    /// Just fetched from the remote service
    Fresh,
    /// Served from the local cache
    Cached,
}

/// Best currently-known rating for a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub score: Option<u32>,
    pub status: RatingStatus,
    /// Set when the latest refresh attempt failed
    pub failed: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RatingOutcome {
    pub fn pending() -> Self {
        Self {
            score: None,
            status: RatingStatus::Pending,
            failed: false,
            expires_at: None,
        }
    }

    pub fn fresh(entry: CacheEntry, ttl: Duration) -> Self {
        Self {
            score: entry.score,
            status: RatingStatus::Fresh,
            failed: false,
            expires_at: entry.expires_at(ttl),
        }
    }

    pub fn cached(entry: CacheEntry, ttl: Duration) -> Self {
        Self {
            score: entry.score,
            status: RatingStatus::Cached,
            failed: false,
            expires_at: entry.expires_at(ttl),
        }
    }

    /// Refresh failed; fall back to the last known cached value
    pub fn failed_with_cache(entry: CacheEntry, ttl: Duration) -> Self {
        Self {
            failed: true,
            ..Self::cached(entry, ttl)
        }
    }

    /// Refresh failed and nothing was ever cached
    pub fn failed_without_cache() -> Self {
        Self {
            score: None,
            status: RatingStatus::Cached,
            failed: true,
            expires_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RatingStatus::Pending
    }
}
