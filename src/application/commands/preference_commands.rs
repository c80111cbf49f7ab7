// src/application/commands/preference_commands.rs

use crate::application::{dto::*, state::AppState};
use crate::domain::preference::{DEFAULT_IMAGE_SIZE, IMAGE_SIZE, PADDING};
use crate::domain::{parse_image_size, DomainError};
use crate::error::AppResult;

/// Store the thumbnail size in canonical "<n>px" form
pub fn set_image_size(state: &AppState, value: &str) -> AppResult<PreferenceDto> {
    let size = parse_image_size(value).ok_or_else(|| {
        DomainError::InvariantViolation(format!("Not a pixel size: {:?}", value))
    })?;
    state.preferences.write_preference(IMAGE_SIZE, &size)?;

    Ok(PreferenceDto {
        name: IMAGE_SIZE.to_string(),
        value: size,
    })
}

/// Store the wrapper padding; an empty value disables it
pub fn set_padding(state: &AppState, value: &str) -> AppResult<PreferenceDto> {
    let value = value.trim();
    state.preferences.write_preference(PADDING, value)?;

    Ok(PreferenceDto {
        name: PADDING.to_string(),
        value: value.to_string(),
    })
}

pub fn get_preferences(state: &AppState) -> Vec<PreferenceDto> {
    [(IMAGE_SIZE, DEFAULT_IMAGE_SIZE), (PADDING, "")]
        .into_iter()
        .map(|(name, default)| PreferenceDto {
            name: name.to_string(),
            value: state.preferences.read_preference(name, default),
        })
        .collect()
}
