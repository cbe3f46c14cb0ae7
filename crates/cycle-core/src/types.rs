use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Daily OHLCV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Quarterly inventory and capital expenditure figures.
///
/// `capex` is always stored as a non-negative magnitude; cash-flow statements
/// report it as an outflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRow {
    pub date: NaiveDate,
    pub inventory: f64,
    pub capex: f64,
}

impl FundamentalRow {
    pub fn new(date: NaiveDate, inventory: f64, capex: f64) -> Self {
        Self {
            date,
            inventory,
            capex: capex.abs(),
        }
    }
}

/// Themed news item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub source: String,
    /// Publication timestamp as reported by the provider (RFC 3339 or RFC 2822)
    pub published: String,
    pub url: String,
    /// Query that produced the item
    #[serde(default)]
    pub topic: String,
}

impl NewsItem {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published)
    }

    /// Text fed to the sentiment scorer.
    pub fn sentiment_text(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }
}

/// Pricing headline scraped from a query feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingHeadline {
    pub date: String,
    pub headline: String,
    pub source: String,
    pub url: String,
    pub query: String,
}

/// Stock close relative to a benchmark close on the same date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeStrengthRow {
    pub date: NaiveDate,
    pub close_stock: f64,
    pub close_benchmark: f64,
    pub relative_strength: f64,
}

/// Parse a provider timestamp, accepting RFC 3339 (NewsAPI) and RFC 2822 (RSS).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Sort news newest first. Items without a parseable timestamp go last, in
/// their original order.
pub fn sort_news_by_published_desc(items: &mut [NewsItem]) {
    items.sort_by(|a, b| match (a.published_at(), b.published_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Drop repeated `(headline, url)` pairs, keeping the first occurrence.
pub fn dedup_headlines(rows: Vec<PricingHeadline>) -> Vec<PricingHeadline> {
    let mut seen = std::collections::HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert((row.headline.clone(), row.url.clone())))
        .collect()
}
