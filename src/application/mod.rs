// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between the command line and the services
// - Wires stores, the rating fetcher and the pipeline into AppState
// - Translates domain values into DTOs

pub mod commands;
pub mod dto;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use state::AppState;
