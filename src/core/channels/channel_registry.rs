use async_trait::async_trait;
use tokio::sync::Mutex;

use super::channel_models::ChannelMap;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for the whole guild -> channel map. Implementations read and write
/// the map as one unit.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn load(&self) -> Result<ChannelMap, RegistryError>;
    async fn save(&self, channels: &ChannelMap) -> Result<(), RegistryError>;
}

/// Where each guild wants its news posted.
///
/// Every call goes back to the store, so edits made to the file by hand are
/// picked up on the next read. Unreadable state is treated as "no entries".
pub struct ChannelRegistry<S: ChannelStore> {
    store: S,
    // Serializes read-modify-write cycles in `set_channel`.
    write_lock: Mutex<()>,
}

impl<S: ChannelStore> ChannelRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot of every registered guild. Never fails.
    pub async fn get_all(&self) -> ChannelMap {
        match self.store.load().await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::warn!("Channel registry unreadable, treating as empty: {}", e);
                ChannelMap::new()
            }
        }
    }

    /// Point a guild at a channel. Last write wins.
    ///
    /// Corrupt content is replaced, but a failed read aborts the write so a
    /// transient I/O error can't wipe the other guilds.
    pub async fn set_channel(&self, guild_id: &str, channel_id: &str) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().await;

        let mut channels = match self.store.load().await {
            Ok(channels) => channels,
            Err(RegistryError::Serialization(e)) => {
                tracing::warn!("Channel registry corrupt, starting a new one: {}", e);
                ChannelMap::new()
            }
            Err(e) => return Err(e),
        };
        channels.insert(guild_id.to_string(), channel_id.to_string());
        self.store.save(&channels).await?;

        tracing::info!(guild_id, channel_id, "News channel updated");
        Ok(())
    }
}
