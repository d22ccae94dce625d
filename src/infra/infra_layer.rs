// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "channels/mod.rs"]
pub mod channels;

#[path = "news/mod.rs"]
pub mod news;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "web/mod.rs"]
pub mod web;
