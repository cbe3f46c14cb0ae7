use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use cycle_core::{CycleError, NewsItem, NewsProvider};
use serde::Deserialize;
use std::time::Duration;

use crate::{http_client, request_error, strip_html};

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
/// NewsAPI rejects page sizes above 100
const MAX_PAGE_SIZE: usize = 100;
const SOURCE: &str = "NewsAPI";

#[derive(Debug, Deserialize)]
pub struct EverythingResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<NewsApiSource>,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiSource {
    pub name: Option<String>,
}

/// NewsAPI `/v2/everything` backend, used when an API key is configured.
pub struct NewsApiClient {
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, CycleError> {
        Ok(Self {
            api_key,
            client: http_client(timeout)?,
        })
    }
}

/// Convert a decoded response into news items tagged with `query`.
pub fn articles_to_news(response: EverythingResponse, query: &str) -> Result<Vec<NewsItem>, CycleError> {
    if response.status.as_deref() == Some("error") {
        return Err(CycleError::Provider(format!(
            "NewsAPI error: {}",
            response.message.unwrap_or_default()
        )));
    }

    Ok(response
        .articles
        .into_iter()
        .map(|article| NewsItem {
            title: article.title.unwrap_or_default(),
            description: article.description.map(|d| strip_html(&d)).unwrap_or_default(),
            source: article.source.and_then(|s| s.name).unwrap_or_default(),
            published: article.published_at.unwrap_or_default(),
            url: article.url.unwrap_or_default(),
            topic: query.to_string(),
        })
        .collect())
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_news(&self, query: &str, days_back: i64, limit: usize) -> Result<Vec<NewsItem>, CycleError> {
        let from = (Utc::now() - ChronoDuration::days(days_back)).format("%Y-%m-%d").to_string();
        let page_size = limit.min(MAX_PAGE_SIZE).to_string();

        let response = self
            .client
            .get(NEWSAPI_URL)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(request_error(SOURCE))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CycleError::http_status(SOURCE, status.as_u16(), &body));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| CycleError::Parse(e.to_string()))?;

        let news = articles_to_news(body, query)?;
        tracing::debug!("NewsAPI returned {} articles for '{}'", news.len(), query);
        Ok(news)
    }

    fn backend_name(&self) -> &'static str {
        "newsapi"
    }
}
