// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "channels/mod.rs"]
pub mod channels;

#[path = "news/mod.rs"]
pub mod news;
