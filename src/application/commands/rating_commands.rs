// src/application/commands/rating_commands.rs

use chrono::Utc;

use crate::application::{dto::*, state::AppState};
use crate::error::{AppError, AppResult};

/// Resolve one title's rating, waiting for the refresh when one is started
pub async fn get_rating(state: &AppState, title: &str, force: bool) -> AppResult<RatingDto> {
    let resolution = state.ratings.resolve(title, force, |_| {});

    let outcome = match resolution.refresh {
        Some(refresh) => refresh
            .await
            .map_err(|e| AppError::Other(format!("Rating refresh task failed: {}", e)))?,
        None => resolution.current,
    };

    Ok(RatingDto::from_outcome(&resolution.key, &outcome, Utc::now()))
}
