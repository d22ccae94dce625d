use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use thiserror::Error;

use super::formatting::build_post;
use super::news_models::{Article, NewsPost, Topic};
use super::posted_urls::PostedUrls;
use super::scheduler::Ticker;
use crate::core::channels::{ChannelRegistry, ChannelStore};

/// Errors raised while fetching or delivering news.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("News API error: {0}")]
    Fetch(String),
    #[error("Channel {0} is unavailable: {1}")]
    ChannelUnavailable(String, String),
    #[error("Failed to deliver post: {0}")]
    Delivery(String),
}

/// Source of articles for a search query.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    /// The single most recently published match, if any.
    async fn fetch_top_article(&self, query: &str) -> Result<Option<Article>, NewsError>;
}

/// Best-effort text compression. Failures are handled inside and come back as `None`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Option<String>;
}

#[async_trait]
impl Summarizer for Box<dyn Summarizer> {
    async fn summarize(&self, text: &str) -> Option<String> {
        (**self).summarize(text).await
    }
}

/// Where posts end up. Resolving a channel is separate from sending so that a
/// stale channel id is detected once per guild, not once per article.
#[async_trait]
pub trait NewsSink: Send + Sync {
    type Channel: Send + Sync;

    async fn resolve_channel(&self, channel_id: &str) -> Result<Self::Channel, NewsError>;
    async fn send_post(&self, channel: &Self::Channel, post: &NewsPost) -> Result<(), NewsError>;
}

/// Counters for one run of the dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub topics_fetched: usize,
    pub topics_failed: usize,
    pub sent: usize,
    pub duplicates_skipped: usize,
    pub unreachable_guilds: usize,
    pub failed_sends: usize,
}

/// Fetches every topic and posts each new article to every registered guild.
///
/// The posted-url history lives here, so dropping the cycle and building a new
/// one behaves exactly like a process restart.
pub struct NewsCycle<F, M, K, S>
where
    F: NewsFetcher,
    M: Summarizer,
    K: NewsSink,
    S: ChannelStore,
{
    fetcher: F,
    summarizer: M,
    sink: K,
    registry: Arc<ChannelRegistry<S>>,
    topics: Vec<Topic>,
    timezone: Tz,
    posted: PostedUrls,
}

impl<F, M, K, S> NewsCycle<F, M, K, S>
where
    F: NewsFetcher,
    M: Summarizer,
    K: NewsSink,
    S: ChannelStore,
{
    pub fn new(
        fetcher: F,
        summarizer: M,
        sink: K,
        registry: Arc<ChannelRegistry<S>>,
        topics: Vec<Topic>,
        timezone: Tz,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            sink,
            registry,
            topics,
            timezone,
            posted: PostedUrls::new(),
        }
    }

    #[cfg(test)]
    pub fn posted(&self) -> &PostedUrls {
        &self.posted
    }

    /// One full fetch-and-post pass. Every failure is contained to its topic,
    /// guild or post and shows up in the returned report.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        // Guilds registered after this point wait for the next cycle.
        let channels = self.registry.get_all().await;
        if channels.is_empty() {
            tracing::debug!("No news channels registered, skipping cycle");
            return report;
        }

        let articles = self.fetch_articles(&mut report).await;
        if articles.is_empty() {
            tracing::info!(
                topics_failed = report.topics_failed,
                "No articles fetched this cycle"
            );
            return report;
        }

        // Summaries are shared across guilds within a cycle.
        let mut summaries: HashMap<String, Option<String>> = HashMap::new();

        for (guild_id, channel_id) in &channels {
            let channel = match self.sink.resolve_channel(channel_id).await {
                Ok(channel) => channel,
                Err(e) => {
                    tracing::warn!(
                        guild_id = guild_id.as_str(),
                        channel_id = channel_id.as_str(),
                        error = %e,
                        "Failed to post news in guild"
                    );
                    report.unreachable_guilds += 1;
                    continue;
                }
            };

            for (topic, article) in &articles {
                // Marked before sending: a failed send is not retried next cycle.
                if !self.posted.mark_posted(guild_id, &article.url) {
                    report.duplicates_skipped += 1;
                    continue;
                }

                let summary = match summaries.get(&article.url) {
                    Some(summary) => summary.clone(),
                    None => {
                        let summary = self.summarizer.summarize(article.summary_source()).await;
                        summaries.insert(article.url.clone(), summary.clone());
                        summary
                    }
                };

                let post = build_post(topic, article, summary.as_deref(), self.timezone);
                match self.sink.send_post(&channel, &post).await {
                    Ok(()) => report.sent += 1,
                    Err(e) => {
                        tracing::warn!(
                            guild_id = guild_id.as_str(),
                            channel_id = channel_id.as_str(),
                            url = article.url.as_str(),
                            error = %e,
                            "Failed to send news post"
                        );
                        report.failed_sends += 1;
                    }
                }
            }
        }

        tracing::info!(
            guilds = channels.len(),
            topics_fetched = report.topics_fetched,
            topics_failed = report.topics_failed,
            sent = report.sent,
            duplicates_skipped = report.duplicates_skipped,
            unreachable_guilds = report.unreachable_guilds,
            failed_sends = report.failed_sends,
            "News cycle finished"
        );
        report
    }

    /// Run a cycle on every tick until the ticker stops. Returns how many ran.
    pub async fn run<T: Ticker>(&self, mut ticker: T) -> usize {
        let mut cycles = 0;
        while ticker.tick().await {
            self.run_cycle().await;
            cycles += 1;
        }
        cycles
    }

    async fn fetch_articles(&self, report: &mut CycleReport) -> Vec<(&Topic, Article)> {
        let mut articles = Vec::new();
        for topic in &self.topics {
            match self.fetcher.fetch_top_article(&topic.query).await {
                Ok(Some(article)) => {
                    report.topics_fetched += 1;
                    articles.push((topic, article));
                }
                Ok(None) => {
                    report.topics_fetched += 1;
                    tracing::debug!(topic = topic.query.as_str(), "No articles for topic");
                }
                Err(e) => {
                    report.topics_failed += 1;
                    tracing::warn!(topic = topic.query.as_str(), error = %e, "Failed to fetch news");
                }
            }
        }
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channels::channel_registry::tests::MockChannelStore;
    use crate::core::news::formatting::SUMMARY_UNAVAILABLE;
    use crate::core::news::scheduler::tests::CountingTicker;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn article(url: &str, title: &str) -> Article {
        Article {
            url: url.to_string(),
            title: title.to_string(),
            description: None,
            content: None,
            published_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            image_url: None,
            source_name: None,
        }
    }

    /// Query -> canned result. Unknown queries fail.
    struct MockFetcher {
        results: HashMap<String, Option<Article>>,
    }

    impl MockFetcher {
        fn new(entries: Vec<(&str, Option<Article>)>) -> Self {
            Self {
                results: entries
                    .into_iter()
                    .map(|(q, a)| (q.to_string(), a))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl NewsFetcher for MockFetcher {
        async fn fetch_top_article(&self, query: &str) -> Result<Option<Article>, NewsError> {
            self.results
                .get(query)
                .cloned()
                .ok_or_else(|| NewsError::Fetch(format!("500 for {query}")))
        }
    }

    struct MockSummarizer {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl MockSummarizer {
        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for MockSummarizer {
        async fn summarize(&self, _text: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Records every send. Channels listed in `missing` fail to resolve,
    /// channels in `broken` resolve but reject sends.
    #[derive(Default)]
    struct MockSink {
        missing: HashSet<String>,
        broken: HashSet<String>,
        sent: Mutex<Vec<(String, NewsPost)>>,
    }

    impl MockSink {
        fn sent_to(&self, channel_id: &str) -> Vec<NewsPost> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, _)| c == channel_id)
                .map(|(_, p)| p.clone())
                .collect()
        }

        fn total(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NewsSink for MockSink {
        type Channel = String;

        async fn resolve_channel(&self, channel_id: &str) -> Result<String, NewsError> {
            if self.missing.contains(channel_id) {
                return Err(NewsError::ChannelUnavailable(
                    channel_id.to_string(),
                    "Unknown Channel".to_string(),
                ));
            }
            Ok(channel_id.to_string())
        }

        async fn send_post(&self, channel: &String, post: &NewsPost) -> Result<(), NewsError> {
            if self.broken.contains(channel) {
                return Err(NewsError::Delivery("Missing Permissions".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel.clone(), post.clone()));
            Ok(())
        }
    }

    fn topics() -> Vec<Topic> {
        vec![
            Topic::new("🧠 Tech News", "technology"),
            Topic::new("🌍 World News", "world"),
        ]
    }

    fn cycle(
        fetcher: MockFetcher,
        summarizer: MockSummarizer,
        sink: MockSink,
        guilds: &[(&str, &str)],
    ) -> NewsCycle<MockFetcher, MockSummarizer, MockSink, MockChannelStore> {
        let registry = Arc::new(ChannelRegistry::new(MockChannelStore::with(guilds)));
        NewsCycle::new(fetcher, summarizer, sink, registry, topics(), Tz::UTC)
    }

    #[tokio::test]
    async fn test_failed_summary_uses_placeholder() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", None),
        ]);
        let news = cycle(fetcher, MockSummarizer::failing(), MockSink::default(), &[("g1", "c1")]);

        let report = news.run_cycle().await;

        assert_eq!(report.sent, 1);
        let posts = news.sink.sent_to("c1");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "T");
        assert_eq!(posts[0].url, "https://x/1");
        assert_eq!(posts[0].description, SUMMARY_UNAVAILABLE);
        assert!(posts[0].footer.contains("January 1, 2024"));
        assert!(posts[0].footer.contains("Source: Unknown"));
    }

    #[tokio::test]
    async fn test_already_posted_url_is_not_sent() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", None),
        ]);
        let news = cycle(fetcher, MockSummarizer::failing(), MockSink::default(), &[("g1", "c1")]);
        news.posted().mark_posted("g1", "https://x/1");

        let report = news.run_cycle().await;

        assert_eq!(report.sent, 0);
        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(news.sink.total(), 0);
    }

    #[tokio::test]
    async fn test_same_url_across_topics_sent_once() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/shared", "Tech"))),
            ("world", Some(article("https://x/shared", "World"))),
        ]);
        let news = cycle(fetcher, MockSummarizer::failing(), MockSink::default(), &[("g1", "c1")]);

        let report = news.run_cycle().await;

        assert_eq!(report.sent, 1);
        assert_eq!(report.duplicates_skipped, 1);
        let posts = news.sink.sent_to("c1");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Tech");
    }

    #[tokio::test]
    async fn test_failed_topic_does_not_block_others() {
        // "technology" is not known to the fetcher, so it errors
        let fetcher = MockFetcher::new(vec![("world", Some(article("https://x/w", "W")))]);
        let news = cycle(
            fetcher,
            MockSummarizer::failing(),
            MockSink::default(),
            &[("g1", "c1"), ("g2", "c2")],
        );

        let report = news.run_cycle().await;

        assert_eq!(report.topics_failed, 1);
        assert_eq!(report.topics_fetched, 1);
        assert_eq!(news.sink.sent_to("c1").len(), 1);
        assert_eq!(news.sink.sent_to("c2").len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_guild_does_not_block_others() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", Some(article("https://x/2", "W"))),
        ]);
        let sink = MockSink {
            missing: HashSet::from(["c1".to_string()]),
            ..Default::default()
        };
        let news = cycle(fetcher, MockSummarizer::failing(), sink, &[("g1", "c1"), ("g2", "c2")]);

        let report = news.run_cycle().await;

        assert_eq!(report.unreachable_guilds, 1);
        assert_eq!(report.sent, 2);
        assert!(news.sink.sent_to("c1").is_empty());
        assert_eq!(news.sink.sent_to("c2").len(), 2);
        // Nothing was marked for the unreachable guild
        assert_eq!(news.posted().count("g1"), 0);
    }

    #[tokio::test]
    async fn test_failed_send_is_not_retried() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", None),
        ]);
        let sink = MockSink {
            broken: HashSet::from(["c1".to_string()]),
            ..Default::default()
        };
        let news = cycle(fetcher, MockSummarizer::failing(), sink, &[("g1", "c1")]);

        let first = news.run_cycle().await;
        assert_eq!(first.failed_sends, 1);

        let second = news.run_cycle().await;
        assert_eq!(second.failed_sends, 0);
        assert_eq!(second.duplicates_skipped, 1);
    }

    #[tokio::test]
    async fn test_dedup_holds_across_cycles_until_restart() {
        let entries = || {
            vec![
                ("technology", Some(article("https://x/1", "T"))),
                ("world", None),
            ]
        };
        let guilds = [("g1", "c1")];

        let news = cycle(
            MockFetcher::new(entries()),
            MockSummarizer::failing(),
            MockSink::default(),
            &guilds,
        );
        assert_eq!(news.run_cycle().await.sent, 1);
        assert_eq!(news.run_cycle().await.sent, 0);
        assert_eq!(news.sink.total(), 1);

        // A fresh cycle has an empty history, like a restarted process
        let restarted = cycle(
            MockFetcher::new(entries()),
            MockSummarizer::failing(),
            MockSink::default(),
            &guilds,
        );
        assert_eq!(restarted.run_cycle().await.sent, 1);
        assert_eq!(restarted.sink.sent_to("c1").len(), 1);
    }

    #[tokio::test]
    async fn test_summary_computed_once_per_article() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", None),
        ]);
        let news = cycle(
            fetcher,
            MockSummarizer::replying("Short summary."),
            MockSink::default(),
            &[("g1", "c1"), ("g2", "c2"), ("g3", "c3")],
        );

        let report = news.run_cycle().await;

        assert_eq!(report.sent, 3);
        assert_eq!(news.summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(news.sink.sent_to("c3")[0].description, "Short summary.");
    }

    #[tokio::test]
    async fn test_scheduled_runs_share_history() {
        let fetcher = MockFetcher::new(vec![
            ("technology", Some(article("https://x/1", "T"))),
            ("world", Some(article("https://x/2", "W"))),
        ]);
        let news = cycle(fetcher, MockSummarizer::failing(), MockSink::default(), &[("g1", "c1")]);

        let cycles = news.run(CountingTicker { remaining: 3 }).await;

        assert_eq!(cycles, 3);
        assert_eq!(news.sink.total(), 2);
        assert_eq!(news.posted().count("g1"), 2);
    }

    #[tokio::test]
    async fn test_empty_registry_skips_fetching() {
        let fetcher = MockFetcher::new(vec![]);
        let news = cycle(fetcher, MockSummarizer::failing(), MockSink::default(), &[]);

        let report = news.run_cycle().await;

        // The fetcher would have failed both topics had it been called
        assert_eq!(report, CycleReport::default());
    }
}
