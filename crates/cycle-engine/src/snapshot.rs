use chrono::{DateTime, Utc};
use cycle_core::{FundamentalRow, NewsItem, PriceRow, PricingHeadline, RelativeStrengthRow};
use serde::{Deserialize, Serialize};

/// Raw provider data gathered by one refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub benchmark: String,
    pub price: Vec<PriceRow>,
    pub relative: Vec<RelativeStrengthRow>,
    pub fundamentals: Vec<FundamentalRow>,
    /// Themed news across every configured query
    pub news: Vec<NewsItem>,
    pub pricing: Vec<PricingHeadline>,
    pub fetched_at: DateTime<Utc>,
}
