use std::collections::HashSet;

use dashmap::DashMap;

/// Article urls already delivered to each guild during this process lifetime.
///
/// Only grows. Nothing is written to disk, so a restart starts from an empty set.
#[derive(Debug, Default)]
pub struct PostedUrls {
    by_guild: DashMap<String, HashSet<String>>,
}

impl PostedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` for `guild_id`. Returns `false` if it was already there.
    pub fn mark_posted(&self, guild_id: &str, url: &str) -> bool {
        self.by_guild
            .entry(guild_id.to_string())
            .or_default()
            .insert(url.to_string())
    }

    #[cfg(test)]
    pub fn count(&self, guild_id: &str) -> usize {
        self.by_guild.get(guild_id).map(|urls| urls.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_once_per_guild() {
        let posted = PostedUrls::new();

        assert!(posted.mark_posted("g1", "https://x/1"));
        assert!(!posted.mark_posted("g1", "https://x/1"));
        // Other guilds track their own history
        assert!(posted.mark_posted("g2", "https://x/1"));

        assert_eq!(posted.count("g1"), 1);
        assert_eq!(posted.count("g3"), 0);
    }
}
