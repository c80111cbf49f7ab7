// src/integrations/anilist/client.rs
//
// AniList API Integration
//
// ARCHITECTURE:
// - GraphQL client for the AniList API
// - One POST per lookup, spaced by a minimum interval
// - Maps the response to a bare average score (NO cache access)
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Never retries; every failure collapses into a FetchFailure
// - "Not Found" is an answer (no score), not a failure

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{AppError, AppResult};
use crate::integrations::rating_fetcher::{FetchFailure, RatingFetcher};

pub const ANILIST_ENDPOINT: &str = "https://graphql.anilist.co";

const AVERAGE_SCORE_QUERY: &str = r#"
    query ($search: String) {
        Media(search: $search, type: ANIME) {
            averageScore
        }
    }
"#;

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
    status: Option<u16>,
}

/// Single media query wrapper
#[derive(Debug, Deserialize)]
struct MediaScoreData {
    #[serde(rename = "Media")]
    media: Option<MediaScore>,
}

#[derive(Debug, Deserialize)]
struct MediaScore {
    #[serde(rename = "averageScore")]
    average_score: Option<i64>,
}

/// Rate limiter state
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// AniList API Client
pub struct AniListClient {
    base_url: String,
    http_client: Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl AniListClient {
    /// Create a client for the public AniList endpoint
    pub fn new() -> AppResult<Self> {
        Self::with_settings(ANILIST_ENDPOINT, Duration::from_secs(30), Duration::from_millis(700))
    }

    /// Create a client with an explicit endpoint, request timeout and
    /// minimum spacing between requests
    pub fn with_settings(
        base_url: &str,
        timeout: Duration,
        min_interval: Duration,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.to_string(),
            http_client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the average score of the best match for `search`
    pub async fn fetch_average_score(&self, search: &str) -> Result<Option<u32>, FetchFailure> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        debug!("Fetching AniList rating for {:?}", search);

        let response: GraphQLResponse<MediaScoreData> = self
            .execute_query(AVERAGE_SCORE_QUERY, json!({ "search": search }))
            .await?;

        if let Some(errors) = response.errors {
            if errors.iter().any(|e| e.status == Some(StatusCode::NOT_FOUND.as_u16())) {
                info!("AniList has no entry for {:?}", search);
                return Ok(None);
            }
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(FetchFailure::Api(messages.join(", ")));
        }

        let data = response.data.ok_or(FetchFailure::MissingField("data"))?;

        let score = match data.media.and_then(|m| m.average_score) {
            None => None,
            Some(score) if (0..=100).contains(&score) => Some(score as u32),
            Some(score) => {
                return Err(FetchFailure::Malformed(format!(
                    "averageScore {} outside 0-100",
                    score
                )))
            }
        };

        info!("AniList rating for {:?}: {:?}", search, score);
        Ok(score)
    }

    // ========================================================================
    // INTERNAL: GraphQL Execution
    // ========================================================================

    /// Execute a GraphQL query.
    ///
    /// Non-success statuses are failures, except 404 whose body still carries
    /// the GraphQL "Not Found" error and is returned for the caller to read.
    async fn execute_query<T>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<GraphQLResponse<T>, FetchFailure>
    where
        T: for<'de> Deserialize<'de>,
    {
        let body = json!({
            "query": query,
            "variables": variables
        });

        let response = self
            .http_client
            .post(&self.base_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchFailure::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchFailure::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            if status == StatusCode::NOT_FOUND {
                FetchFailure::Status(status.as_u16())
            } else {
                FetchFailure::Malformed(e.to_string())
            }
        })
    }
}

#[async_trait]
impl RatingFetcher for AniListClient {
    async fn fetch_score(&self, normalized_title: &str) -> Result<Option<u32>, FetchFailure> {
        self.fetch_average_score(normalized_title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> AniListClient {
        AniListClient::with_settings(&server.url(), Duration::from_secs(5), Duration::ZERO).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = AniListClient::new().unwrap();
        assert_eq!(client.base_url(), "https://graphql.anilist.co");
    }

    #[tokio::test]
    async fn test_fetch_parses_average_score() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({"variables": {"search": "Frieren"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"Media": {"averageScore": 91}}}"#)
            .create_async()
            .await;

        let score = client_for(&server).fetch_score("Frieren").await;

        mock.assert_async().await;
        assert_eq!(score, Ok(Some(91)));
    }

    #[tokio::test]
    async fn test_null_average_score_is_no_score() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"data": {"Media": {"averageScore": null}}}"#)
            .create_async()
            .await;

        assert_eq!(client_for(&server).fetch_score("New Show").await, Ok(None));
    }

    #[tokio::test]
    async fn test_not_found_is_no_score() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(404)
            .with_body(
                r#"{"errors": [{"message": "Not Found.", "status": 404}], "data": {"Media": null}}"#,
            )
            .create_async()
            .await;

        assert_eq!(client_for(&server).fetch_score("Nonexistent").await, Ok(None));
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        assert_eq!(
            client_for(&server).fetch_score("Frieren").await,
            Err(FetchFailure::Status(500))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let result = client_for(&server).fetch_score("Frieren").await;
        assert!(matches!(result, Err(FetchFailure::Malformed(_))));
    }

    #[tokio::test]
    async fn test_missing_data_is_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"extensions": {}}"#)
            .create_async()
            .await;

        assert_eq!(
            client_for(&server).fetch_score("Frieren").await,
            Err(FetchFailure::MissingField("data"))
        );
    }

    #[tokio::test]
    async fn test_graphql_errors_are_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"errors": [{"message": "Too Many Requests.", "status": 429}], "data": null}"#)
            .create_async()
            .await;

        assert_eq!(
            client_for(&server).fetch_score("Frieren").await,
            Err(FetchFailure::Api("Too Many Requests.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_failure() {
        let client = AniListClient::with_settings(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            Duration::ZERO,
        )
        .unwrap();

        let result = client.fetch_score("Frieren").await;
        assert!(matches!(result, Err(FetchFailure::Network(_))));
    }
}
