// src/config.rs
//
// Runtime configuration: pipeline timings, AniList client settings and the
// host layout. Every field has a default; a JSON file may override any subset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::document::{PREVIEW_ATTRIBUTE, RELEASES_TABLE_ID};
use crate::domain::DEFAULT_RATING_TTL_HOURS;
use crate::error::{AppError, AppResult};
use crate::integrations::anilist::ANILIST_ENDPOINT;
use crate::services::{HostLayout, DEFAULT_DEBOUNCE_MS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    pub debounce_ms: u64,
    pub rating_ttl_hours: i64,
    pub anilist_endpoint: String,
    pub request_timeout_secs: u64,
    pub min_request_interval_ms: u64,
    pub releases_table_id: String,
    pub preview_attribute: String,
    /// Overrides the default database location
    pub database_path: Option<PathBuf>,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            rating_ttl_hours: DEFAULT_RATING_TTL_HOURS,
            anilist_endpoint: ANILIST_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            min_request_interval_ms: 700,
            releases_table_id: RELEASES_TABLE_ID.to_string(),
            preview_attribute: PREVIEW_ATTRIBUTE.to_string(),
            database_path: None,
        }
    }
}

impl EnricherConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        let body = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&body)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.rating_ttl_hours <= 0 {
            return Err(AppError::Other(format!(
                "rating_ttl_hours must be positive, got {}",
                self.rating_ttl_hours
            )));
        }
        if chrono::Duration::try_hours(self.rating_ttl_hours).is_none() {
            return Err(AppError::Other(format!(
                "rating_ttl_hours is out of range, got {}",
                self.rating_ttl_hours
            )));
        }
        if self.releases_table_id.trim().is_empty() || self.preview_attribute.trim().is_empty() {
            return Err(AppError::Other(
                "releases_table_id and preview_attribute must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Falls back to the default TTL when the configured hours are unrepresentable
    pub fn rating_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.rating_ttl_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_RATING_TTL_HOURS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn host_layout(&self) -> HostLayout {
        HostLayout {
            table_id: self.releases_table_id.clone(),
            marker_attribute: self.preview_attribute.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EnricherConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.rating_ttl(), chrono::Duration::hours(6));
        assert_eq!(config.host_layout(), HostLayout::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"debounce_ms": 50, "database_path": "/tmp/x.db"}}"#).unwrap();

        let config = EnricherConfig::load(file.path()).unwrap();

        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(config.anilist_endpoint, ANILIST_ENDPOINT);
        assert_eq!(config.min_request_interval_ms, 700);
    }

    #[test]
    fn test_invalid_ttl_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rating_ttl_hours": 0}}"#).unwrap();

        assert!(matches!(
            EnricherConfig::load(file.path()),
            Err(AppError::Other(_))
        ));
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rating_ttl_hours": 10000000000000}}"#).unwrap();

        assert!(matches!(
            EnricherConfig::load(file.path()),
            Err(AppError::Other(_))
        ));

        let config = EnricherConfig {
            rating_ttl_hours: 10_000_000_000_000,
            ..EnricherConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(
            config.rating_ttl(),
            chrono::Duration::hours(DEFAULT_RATING_TTL_HOURS)
        );
    }

    #[test]
    fn test_unreadable_file() {
        let result = EnricherConfig::load(Path::new("/nonexistent/enricher.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
