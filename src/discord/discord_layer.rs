// Discord layer - commands, event handlers and the news sink.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "events/guild_join.rs"]
pub mod guild_join;

#[path = "news/mod.rs"]
pub mod news;

// Re-export command types for convenience
pub use commands::{Context, Data, Error};
