use async_trait::async_trait;
use cycle_core::{CycleError, NewsItem, NewsProvider};
use serde::Deserialize;
use std::time::Duration;

use crate::{http_client, request_error, strip_html};

const GOOGLE_NEWS_RSS_URL: &str = "https://news.google.com/rss/search";
const DEFAULT_SOURCE: &str = "Google News";
const SOURCE: &str = "Google News RSS";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

/// One `<item>` of an RSS 2.0 channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: Option<RssSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RssSource {
    #[serde(rename = "$text", default)]
    pub name: String,
    #[serde(rename = "@url", default)]
    pub url: Option<String>,
}

impl RssItem {
    pub fn source_name(&self) -> String {
        self.source
            .as_ref()
            .map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SOURCE)
            .to_string()
    }
}

/// Parse an RSS 2.0 document into its items, in feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<RssItem>, CycleError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| CycleError::Parse(format!("Invalid RSS: {}", e)))?;
    Ok(rss.channel.items)
}

/// Query-based Google News RSS search.
#[derive(Clone)]
pub struct GoogleNewsFeed {
    client: reqwest::Client,
}

impl GoogleNewsFeed {
    pub fn new(timeout: Duration) -> Result<Self, CycleError> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<RssItem>, CycleError> {
        let response = self
            .client
            .get(GOOGLE_NEWS_RSS_URL)
            .query(&[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")])
            .send()
            .await
            .map_err(request_error(SOURCE))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CycleError::http_status(SOURCE, status.as_u16(), &body));
        }

        let body = response.text().await.map_err(request_error(SOURCE))?;
        parse_feed(&body)
    }
}

/// News backend used when no NewsAPI key is configured.
pub struct GoogleNewsRssClient {
    feed: GoogleNewsFeed,
}

impl GoogleNewsRssClient {
    pub fn new(timeout: Duration) -> Result<Self, CycleError> {
        Ok(Self {
            feed: GoogleNewsFeed::new(timeout)?,
        })
    }
}

/// Map feed items to news items tagged with the producing query.
pub fn items_to_news(items: Vec<RssItem>, query: &str, limit: usize) -> Vec<NewsItem> {
    items
        .into_iter()
        .take(limit)
        .map(|item| NewsItem {
            source: item.source_name(),
            title: item.title.trim().to_string(),
            description: strip_html(&item.description),
            published: item.pub_date.unwrap_or_default(),
            url: item.link,
            topic: query.to_string(),
        })
        .collect()
}

#[async_trait]
impl NewsProvider for GoogleNewsRssClient {
    /// The RSS search has no date filter, so `days_back` is not applied.
    async fn fetch_news(&self, query: &str, _days_back: i64, limit: usize) -> Result<Vec<NewsItem>, CycleError> {
        let items = self.feed.search(query).await?;
        let news = items_to_news(items, query, limit);
        tracing::debug!("Google News RSS returned {} items for '{}'", news.len(), query);
        Ok(news)
    }

    fn backend_name(&self) -> &'static str {
        "google-news-rss"
    }
}
