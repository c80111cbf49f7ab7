// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the CLI and Services
// - Commands accept plain values, return DTOs
// - Commands NEVER contain business logic

pub mod enrich_commands;
pub mod favorite_commands;
pub mod preference_commands;
pub mod rating_commands;

pub use enrich_commands::*;
pub use favorite_commands::*;
pub use preference_commands::*;
pub use rating_commands::*;
