// Process configuration, read from the environment (and `.env` via dotenv).

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::core::news::Topic;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite-001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub news_api_key: String,
    /// Summaries are skipped entirely when no key is configured.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub channels_file: PathBuf,
    pub news_interval: Duration,
    pub news_language: String,
    pub timezone: Tz,
    pub http_timeout: Duration,
    pub topics: Vec<Topic>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key -> value source.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let news_api_key = get("NEWS_API_KEY").ok_or(ConfigError::Missing("NEWS_API_KEY"))?;
        let gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));
        let gemini_model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let port = parse_or("PORT", get("PORT"), 3000u16)?;
        let channels_file = get("CHANNELS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/channels.json"));

        let interval_minutes = parse_or("NEWS_INTERVAL_MINUTES", get("NEWS_INTERVAL_MINUTES"), 15u64)?;
        if !(1..=1440).contains(&interval_minutes) {
            return Err(ConfigError::Invalid {
                name: "NEWS_INTERVAL_MINUTES",
                reason: format!("{interval_minutes} is outside 1..=1440"),
            });
        }

        let news_language = get("NEWS_LANGUAGE").unwrap_or_else(|| "en".to_string());

        let timezone = match get("NEWS_TIMEZONE") {
            Some(name) => name.trim().parse::<Tz>().map_err(|e| ConfigError::Invalid {
                name: "NEWS_TIMEZONE",
                reason: e.to_string(),
            })?,
            None => Tz::UTC,
        };

        let timeout_secs = parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 20u64)?;

        let topics = match get("NEWS_TOPICS") {
            Some(raw) => parse_topics(&raw)?,
            None => Topic::defaults(),
        };

        Ok(Self {
            discord_token,
            news_api_key,
            gemini_api_key,
            gemini_model,
            port,
            channels_file,
            news_interval: Duration::from_secs(interval_minutes * 60),
            news_language,
            timezone,
            http_timeout: Duration::from_secs(timeout_secs.max(1)),
            topics,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// `label=query;label=query`
fn parse_topics(raw: &str) -> Result<Vec<Topic>, ConfigError> {
    let mut topics = Vec::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (label, query) = entry.split_once('=').ok_or_else(|| ConfigError::Invalid {
            name: "NEWS_TOPICS",
            reason: format!("expected label=query, got `{entry}`"),
        })?;
        let (label, query) = (label.trim(), query.trim());
        if label.is_empty() || query.is_empty() {
            return Err(ConfigError::Invalid {
                name: "NEWS_TOPICS",
                reason: format!("empty label or query in `{entry}`"),
            });
        }
        topics.push(Topic::new(label, query));
    }

    if topics.is_empty() {
        return Err(ConfigError::Invalid {
            name: "NEWS_TOPICS",
            reason: "no topics given".to_string(),
        });
    }
    Ok(topics)
}
