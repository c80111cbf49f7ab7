// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Provides:
// - Rating resolution (cache + fetcher, stale-while-revalidate)
// - Rating presentation
// - Row enrichment
// - Debounced change scheduling

pub mod change_scheduler;
pub mod rating_presenter;
pub mod rating_service;
pub mod row_enricher;


pub use change_scheduler::{
    spawn_change_scheduler, ChangeScheduler, Debouncer, SchedulerState, DEFAULT_DEBOUNCE_MS,
};

pub use rating_presenter::{format_remaining, RatingTone, RatingView, RATING_CLASS};

pub use rating_service::{RatingResolutionService, Resolution};

pub use row_enricher::{
    HostLayout, RowEnricher, ACTION_ATTRIBUTE, FAVORITE_CLASS, KEY_ATTRIBUTE, PROCESSED_CLASS,
    REFRESH_RATING_ACTION, STYLE_ELEMENT_ID, THUMB_SIZE_VARIABLE, TITLE_ATTRIBUTE,
    TOGGLE_FAVORITE_ACTION,
};
