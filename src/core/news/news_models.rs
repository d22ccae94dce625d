use chrono::{DateTime, Utc};

/// One news category polled every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Shown above the article, e.g. "🧠 Tech News".
    pub label: String,
    /// Search text sent to the news API.
    pub query: String,
}

impl Topic {
    pub fn new(label: &str, query: &str) -> Self {
        Self {
            label: label.to_string(),
            query: query.to_string(),
        }
    }

    /// The two categories the bot has always carried.
    pub fn defaults() -> Vec<Topic> {
        vec![
            Topic::new("🧠 Tech News", "technology"),
            Topic::new("🌍 Israel-Iran News", "israel iran"),
        ]
    }
}

/// A fetched article. The url doubles as its identity for dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub source_name: Option<String>,
}

impl Article {
    /// Text handed to the summarizer: content, then description, then title.
    pub fn summary_source(&self) -> &str {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or(self.title.as_str())
    }
}

/// Platform-neutral rendering of an article, ready to become an embed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsPost {
    pub topic_label: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub image_url: Option<String>,
    pub footer: String,
}
