use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use cycle_core::{dedup_headlines, parse_timestamp, CycleError, PricingHeadline, PricingHeadlineProvider};
use std::time::Duration;

use crate::google_rss::{GoogleNewsFeed, RssItem};

/// Items kept from each query's feed
pub const HEADLINES_PER_QUERY: usize = 15;

/// Collects DRAM/HBM pricing headlines from Google News searches.
pub struct GoogleNewsPricingScraper {
    feed: GoogleNewsFeed,
}

impl GoogleNewsPricingScraper {
    pub fn new(timeout: Duration) -> Result<Self, CycleError> {
        Ok(Self {
            feed: GoogleNewsFeed::new(timeout)?,
        })
    }
}

/// Map one query's feed items to headlines. Items without a usable
/// publication date are stamped with `today`.
pub fn items_to_headlines(items: Vec<RssItem>, query: &str, today: NaiveDate) -> Vec<PricingHeadline> {
    items
        .into_iter()
        .take(HEADLINES_PER_QUERY)
        .map(|item| {
            let date = item
                .pub_date
                .as_deref()
                .and_then(parse_timestamp)
                .map(|ts| ts.date_naive())
                .unwrap_or(today);
            PricingHeadline {
                date: date.format("%Y-%m-%d").to_string(),
                headline: item.title.trim().to_string(),
                source: item.source_name(),
                url: item.link.clone(),
                query: query.to_string(),
            }
        })
        .collect()
}

#[async_trait]
impl PricingHeadlineProvider for GoogleNewsPricingScraper {
    async fn collect_dram_price_signals(&self, queries: &[String]) -> Result<Vec<PricingHeadline>, CycleError> {
        let today = Utc::now().date_naive();
        let mut rows = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0usize;

        for query in queries {
            match self.feed.search(query).await {
                Ok(items) => {
                    succeeded += 1;
                    rows.extend(items_to_headlines(items, query, today));
                }
                Err(e) => {
                    tracing::warn!("Pricing query '{}' failed: {}", query, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(dedup_headlines(rows)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google_rss::parse_feed;

    const PRICING_FEED: &str = r#"<rss version="2.0"><channel>
        <item>
          <title>TrendForce: DRAM contract prices to rise 10% next quarter</title>
          <link>https://news.google.com/articles/tf1</link>
          <pubDate>Tue, 04 Mar 2025 02:15:00 GMT</pubDate>
          <source url="https://www.trendforce.com">TrendForce</source>
        </item>
        <item>
          <title>Samsung expands HBM4 lines</title>
          <link>https://news.google.com/articles/hbm</link>
        </item>
    </channel></rss>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_items_to_headlines_dates() {
        let items = parse_feed(PRICING_FEED).unwrap();
        let rows = items_to_headlines(items, "DRAM spot price trendforce", today());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-03-04");
        assert_eq!(rows[0].source, "TrendForce");
        assert_eq!(rows[0].query, "DRAM spot price trendforce");
        // no pubDate
        assert_eq!(rows[1].date, "2025-03-10");
        assert_eq!(rows[1].source, "Google News");
    }

    #[test]
    fn test_items_to_headlines_caps_per_query() {
        let items: Vec<RssItem> = (0..40)
            .map(|i| RssItem {
                title: format!("headline {i}"),
                link: format!("https://example.com/{i}"),
                ..Default::default()
            })
            .collect();
        assert_eq!(items_to_headlines(items, "q", today()).len(), HEADLINES_PER_QUERY);
    }

    #[test]
    fn test_overlapping_queries_dedupe() {
        let mut rows = items_to_headlines(parse_feed(PRICING_FEED).unwrap(), "DRAM", today());
        rows.extend(items_to_headlines(parse_feed(PRICING_FEED).unwrap(), "HBM", today()));
        let rows = dedup_headlines(rows);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.query == "DRAM"));
    }
}
