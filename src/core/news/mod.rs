pub mod formatting;
pub mod news_models;
pub mod news_service;
pub mod posted_urls;
pub mod scheduler;

pub use news_models::{Article, NewsPost, Topic};
pub use news_service::{NewsCycle, NewsError, NewsFetcher, NewsSink, Summarizer};
pub use scheduler::aligned_interval;
