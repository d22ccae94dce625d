// Discord commands module.
// Each feature gets its own command file, shared framework types live here.

use std::sync::Arc;

use crate::config::BotConfig;
use crate::core::channels::ChannelRegistry;
use crate::infra::channels::JsonChannelStore;

pub mod setchannel;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// State shared with every command and event handler.
pub struct Data {
    pub channels: Arc<ChannelRegistry<JsonChannelStore>>,
    pub config: Arc<BotConfig>,
}
