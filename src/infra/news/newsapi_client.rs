use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;

use crate::core::news::{Article, NewsError, NewsFetcher};

/// Minimal client for the NewsAPI `everything` endpoint.
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl NewsApiClient {
    pub fn new(api_key: String, language: String, timeout: Duration) -> Result<Self, NewsError> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static("RustNewsBot/0.1"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| NewsError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://newsapi.org/v2".to_string(),
            api_key,
            language,
        })
    }

    /// Point the client at another NewsAPI-compatible host.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
        value
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn non_empty(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.trim().is_empty())
    }

    /// Turn a raw API article into ours. Entries without a url can't be
    /// deduplicated and are dropped.
    fn map_article(api: ApiArticle) -> Option<Article> {
        let url = Self::non_empty(api.url)?;
        Some(Article {
            title: Self::non_empty(api.title).unwrap_or_else(|| "Untitled article".to_string()),
            description: Self::non_empty(api.description),
            content: Self::non_empty(api.content),
            published_at: Self::parse_datetime(api.published_at.as_deref()),
            image_url: Self::non_empty(api.url_to_image),
            source_name: api.source.and_then(|s| Self::non_empty(s.name)),
            url,
        })
    }

    fn first_article(body: &str) -> Result<Option<Article>, NewsError> {
        let response: ApiResponse =
            serde_json::from_str(body).map_err(|e| NewsError::Fetch(e.to_string()))?;

        if response.status.as_deref() == Some("error") {
            return Err(NewsError::Fetch(format!(
                "{}: {}",
                response.code.unwrap_or_else(|| "unknown".to_string()),
                response.message.unwrap_or_default()
            )));
        }

        Ok(response
            .articles
            .unwrap_or_default()
            .into_iter()
            .find_map(Self::map_article))
    }
}

#[async_trait]
impl NewsFetcher for NewsApiClient {
    async fn fetch_top_article(&self, query: &str) -> Result<Option<Article>, NewsError> {
        let url = format!("{}/everything", self.base_url);
        let resp = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("language", self.language.as_str()),
                ("pageSize", "1"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| NewsError::Fetch(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| NewsError::Fetch(e.without_url().to_string()))?;

        if !status.is_success() {
            // NewsAPI reports errors as JSON; fall back to the status line.
            return match Self::first_article(&body) {
                Err(e) => Err(e),
                Ok(_) => Err(NewsError::Fetch(format!("NewsAPI returned {status}"))),
            };
        }

        Self::first_article(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    articles: Option<Vec<ApiArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
    published_at: Option<String>,
    url_to_image: Option<String>,
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}
