// Turns fetched articles into the text that ends up in a Discord embed.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::news_models::{Article, NewsPost, Topic};

pub const SUMMARY_UNAVAILABLE: &str = "_Summary unavailable_";
pub const UNKNOWN_SOURCE: &str = "Unknown";
pub const UNKNOWN_DATE: &str = "Unknown date";

// Discord embed limits.
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;

/// "January 1, 2024, 12:00 AM UTC" in the configured zone.
pub fn format_published(published_at: Option<DateTime<Utc>>, tz: Tz) -> String {
    match published_at {
        Some(dt) => dt
            .with_timezone(&tz)
            .format("%B %-d, %Y, %I:%M %p %Z")
            .to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

pub fn build_post(topic: &Topic, article: &Article, summary: Option<&str>, tz: Tz) -> NewsPost {
    let description = summary
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(SUMMARY_UNAVAILABLE);

    let source = article
        .source_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN_SOURCE);

    NewsPost {
        topic_label: topic.label.clone(),
        title: truncate_chars(&article.title, MAX_TITLE_CHARS),
        url: article.url.clone(),
        description: truncate_chars(description, MAX_DESCRIPTION_CHARS),
        image_url: article.image_url.clone(),
        footer: format!(
            "Published: {} | Source: {}",
            format_published(article.published_at, tz),
            source
        ),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
