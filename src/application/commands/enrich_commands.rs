// src/application/commands/enrich_commands.rs

use std::time::Duration;

use log::info;

use crate::application::{dto::*, state::AppState};
use crate::document::{append_release_rows, create_releases_table, lock_document, HostRelease};
use crate::error::AppResult;
use crate::services::PROCESSED_CLASS;

/// Extra wait after the last batch so the final debounced rescan has run
const SETTLE_MARGIN: Duration = Duration::from_millis(50);

/// Feed releases into the live document the way the host page does (in
/// batches, with pauses), let the scheduler enrich them, wait for every
/// rating refresh, and return the resulting page.
pub async fn enrich_releases(
    state: &AppState,
    releases: &[HostRelease],
    batch_size: usize,
    batch_interval: Duration,
) -> AppResult<EnrichmentReportDto> {
    let layout = state.enricher.layout().clone();

    let table = {
        let mut document = lock_document(state.enricher.document());
        match document.element_by_id(&layout.table_id) {
            Some(table) => table,
            None => create_releases_table(&mut document, &layout.table_id),
        }
    };

    let watcher = state.start_watching();

    for batch in releases.chunks(batch_size.max(1)) {
        {
            let mut document = lock_document(state.enricher.document());
            append_release_rows(&mut document, table, batch, &layout.marker_attribute);
        }
        tokio::time::sleep(batch_interval).await;
    }

    tokio::time::sleep(state.config.debounce() + SETTLE_MARGIN).await;
    state.enricher.settle().await;
    watcher.abort();

    let document = lock_document(state.enricher.document());
    let enriched = document
        .find_all(table, |doc, node| doc.has_class(node, PROCESSED_CLASS))
        .len();
    info!("Enriched {} of {} release row(s)", enriched, releases.len());

    Ok(EnrichmentReportDto {
        rows: releases.len(),
        enriched,
        html: document.to_html(document.root()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::{
        clear_favorites, get_preferences, get_rating, list_favorites, set_image_size,
        toggle_favorite,
    };
    use crate::config::EnricherConfig;
    use crate::error::AppError;
    use crate::integrations::MockRatingFetcher;
    use crate::repositories::MemoryBlobStore;
    use std::sync::Arc;

    fn state_with(fetcher: MockRatingFetcher) -> AppState {
        AppState::new(
            EnricherConfig::default(),
            Arc::new(MemoryBlobStore::new()),
            Arc::new(fetcher),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrich_releases_reports_every_row() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().returning(|_| Ok(Some(70)));
        let state = state_with(fetcher);

        let releases = vec![
            HostRelease::new("Show A - 01", "https://img.example/a.jpg"),
            HostRelease::new("Show B - 02", "https://img.example/b.jpg"),
            HostRelease::new("Show C - 03", "https://img.example/c.jpg"),
        ];

        let report = enrich_releases(&state, &releases, 2, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.enriched, 3);
        assert_eq!(report.html.matches("⭐ 70%").count(), 3);
        assert_eq!(report.html.matches("id=\"sp-styles\"").count(), 1);
    }

    #[tokio::test]
    async fn test_get_rating_waits_for_refresh() {
        let mut fetcher = MockRatingFetcher::new();
        fetcher.expect_fetch_score().times(1).returning(|_| Ok(Some(55)));
        let state = state_with(fetcher);

        let first = get_rating(&state, "Show - 01", false).await.unwrap();
        assert_eq!(first.key, "Show");
        assert_eq!(first.status, "fresh");
        assert_eq!(first.display, "⭐ 55%");

        let second = get_rating(&state, "Show - 02", false).await.unwrap();
        assert_eq!(second.status, "cached");
        assert_eq!(second.score, Some(55));
    }

    #[test]
    fn test_favorite_commands() {
        let state = state_with(MockRatingFetcher::new());

        let toggled = toggle_favorite(&state, "Show (Batch)").unwrap();
        assert_eq!(toggled.key, "Show");
        assert!(toggled.is_favorite);

        let listed = list_favorites(&state);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].original_title, "Show (Batch)");

        assert!(matches!(clear_favorites(&state, false), Err(AppError::Other(_))));
        assert_eq!(list_favorites(&state).len(), 1);
        assert_eq!(clear_favorites(&state, true).unwrap(), 1);
        assert!(list_favorites(&state).is_empty());
    }

    #[test]
    fn test_image_size_command_validates() {
        let state = state_with(MockRatingFetcher::new());

        assert_eq!(set_image_size(&state, "256").unwrap().value, "256px");
        assert!(matches!(set_image_size(&state, "huge"), Err(AppError::Domain(_))));

        let prefs = get_preferences(&state);
        assert_eq!(prefs[0].value, "256px");
        assert_eq!(prefs[1].value, "");
    }
}
