use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::channels::{ChannelMap, ChannelStore, RegistryError};

/// Keeps the guild -> channel map in a single pretty-printed JSON object,
/// rewritten in full on every save.
///
/// Saves go to a sibling `.tmp` file that is then renamed over the real one,
/// so a concurrent reader sees either the old map or the new one.
pub struct JsonChannelStore {
    path: PathBuf,
}

impl JsonChannelStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "channels.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ChannelStore for JsonChannelStore {
    async fn load(&self) -> Result<ChannelMap, RegistryError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ChannelMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    async fn save(&self, channels: &ChannelMap) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let text = serde_json::to_string_pretty(channels)?;
        let temp = self.temp_path();
        fs::write(&temp, text).await?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
