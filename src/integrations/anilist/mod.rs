// src/integrations/anilist/mod.rs

pub mod client;

pub use client::{AniListClient, ANILIST_ENDPOINT};
