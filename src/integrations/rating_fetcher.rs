// src/integrations/rating_fetcher.rs
//
// Rating Fetcher port
//
// One remote lookup per call. No retries, no caching: retry and fallback
// policy belong to the caller.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Why a lookup produced no usable answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("API errors: {0}")]
    Api(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RatingFetcher: Send + Sync {
    /// Look up the average score (0-100) for a normalized title.
    ///
    /// `Ok(None)` means the lookup succeeded but the service has no score.
    async fn fetch_score(&self, normalized_title: &str) -> Result<Option<u32>, FetchFailure>;
}
