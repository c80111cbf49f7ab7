// src/application/commands/favorite_commands.rs

use log::info;

use crate::application::{dto::*, state::AppState};
use crate::domain::normalize_title;
use crate::error::{AppError, AppResult};

/// Flip the favorite state of a title
pub fn toggle_favorite(state: &AppState, title: &str) -> AppResult<FavoriteToggleDto> {
    let is_favorite = state.favorites.toggle(title)?;

    Ok(FavoriteToggleDto {
        key: normalize_title(title),
        is_favorite,
    })
}

/// List favorites ordered by key
pub fn list_favorites(state: &AppState) -> Vec<FavoriteDto> {
    state
        .favorites
        .list()
        .into_iter()
        .map(FavoriteDto::from)
        .collect()
}

/// Remove every favorite. Refuses unless the caller confirmed.
pub fn clear_favorites(state: &AppState, confirmed: bool) -> AppResult<usize> {
    if !confirmed {
        return Err(AppError::Other(
            "Clearing favorites is destructive; confirmation required".to_string(),
        ));
    }

    let removed = state.favorites.list().len();
    state.favorites.clear_all()?;
    info!("Cleared {} favorite(s)", removed);
    Ok(removed)
}
