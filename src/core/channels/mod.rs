pub mod channel_models;
pub mod channel_registry;

pub use channel_models::{pick_default_channel, ChannelCandidate, ChannelMap};
pub use channel_registry::{ChannelRegistry, ChannelStore, RegistryError};
