use async_trait::async_trait;
use crate::{CycleResult, FundamentalRow, NewsItem, PriceRow, PricingHeadline};

/// Source of daily price history
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Ascending daily rows covering roughly the last `lookback_days` calendar days.
    async fn get_price_history(&self, ticker: &str, lookback_days: i64) -> CycleResult<Vec<PriceRow>>;
}

/// Source of quarterly statement line items
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn get_inventory_and_capex(&self, ticker: &str) -> CycleResult<Vec<FundamentalRow>>;
}

/// Themed news search. An empty result is a valid answer.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, query: &str, days_back: i64, limit: usize) -> CycleResult<Vec<NewsItem>>;

    fn backend_name(&self) -> &'static str;
}

/// DRAM/HBM pricing headlines collected across several queries
#[async_trait]
pub trait PricingHeadlineProvider: Send + Sync {
    async fn collect_dram_price_signals(&self, queries: &[String]) -> CycleResult<Vec<PricingHeadline>>;
}
