// src/integrations/mod.rs
//
// External Integrations Module

pub mod anilist;
pub mod rating_fetcher;

pub use anilist::client::AniListClient;
pub use rating_fetcher::{FetchFailure, RatingFetcher};

#[cfg(test)]
pub use rating_fetcher::MockRatingFetcher;
