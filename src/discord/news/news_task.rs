// Wires the core news cycle to real collaborators and runs it in the background.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::task::JoinHandle;

use super::news_sink::DiscordNewsSink;
use crate::core::news::{aligned_interval, NewsCycle, Summarizer};
use crate::discord::{Data, Error};
use crate::infra::ai::{DisabledSummarizer, GeminiSummarizer};
use crate::infra::channels::JsonChannelStore;
use crate::infra::news::NewsApiClient;

pub type DiscordNewsCycle =
    NewsCycle<NewsApiClient, Box<dyn Summarizer>, DiscordNewsSink, JsonChannelStore>;

pub fn build_news_cycle(http: Arc<serenity::Http>, data: &Data) -> Result<DiscordNewsCycle, Error> {
    let config = &data.config;

    let fetcher = NewsApiClient::new(
        config.news_api_key.clone(),
        config.news_language.clone(),
        config.http_timeout,
    )?;

    let summarizer: Box<dyn Summarizer> = match &config.gemini_api_key {
        Some(key) => Box::new(GeminiSummarizer::new(
            key.clone(),
            config.gemini_model.clone(),
            config.http_timeout,
        )?),
        None => {
            tracing::warn!("No GEMINI_API_KEY set, news will be posted without summaries");
            Box::new(DisabledSummarizer)
        }
    };

    Ok(NewsCycle::new(
        fetcher,
        summarizer,
        DiscordNewsSink::new(http),
        Arc::clone(&data.channels),
        config.topics.clone(),
        config.timezone,
    ))
}

/// Start the periodic news task. Cycles are aligned to the wall clock.
pub fn spawn_news_task(http: Arc<serenity::Http>, data: &Data) -> Result<JoinHandle<()>, Error> {
    let news = build_news_cycle(http, data)?;
    let period = data.config.news_interval;

    tracing::info!(
        interval_minutes = period.as_secs() / 60,
        topics = data.config.topics.len(),
        "News dispatch scheduled"
    );

    Ok(tokio::spawn(async move {
        let ticker = aligned_interval(chrono::Utc::now(), period);
        news.run(ticker).await;
    }))
}
