use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    // Tickers
    pub ticker: String,                    // MU
    pub benchmark_ticker: String,          // SOXX

    // History windows
    pub lookback_days: i64,                // 420 calendar days of prices
    pub sentiment_window_days: i64,        // 14

    // News backend
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,      // NewsAPI when set, Google News RSS otherwise
    pub news_limit: usize,                 // 30 per query

    // Themed queries
    pub dram_query: String,
    pub ai_capex_query: String,
    pub hbm_query: String,
    pub pricing_queries: Vec<String>,

    // Transport and caching
    pub cache_ttl_secs: i64,               // 600
    pub http_timeout_secs: u64,            // 20
}

const DEFAULT_DRAM_QUERY: &str = "DRAM spot price trendforce";
const DEFAULT_AI_CAPEX_QUERY: &str = "AI capex slowdown hyperscaler";
const DEFAULT_HBM_QUERY: &str = "Samsung HBM4 capacity expansion";

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            ticker: "MU".to_string(),
            benchmark_ticker: "SOXX".to_string(),
            lookback_days: 420,
            sentiment_window_days: 14,
            news_api_key: None,
            news_limit: 30,
            dram_query: DEFAULT_DRAM_QUERY.to_string(),
            ai_capex_query: DEFAULT_AI_CAPEX_QUERY.to_string(),
            hbm_query: DEFAULT_HBM_QUERY.to_string(),
            pricing_queries: vec![DEFAULT_DRAM_QUERY.to_string(), DEFAULT_HBM_QUERY.to_string()],
            cache_ttl_secs: 600,
            http_timeout_secs: 20,
        }
    }
}

impl CycleConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let dram_query = get("DRAM_QUERY", DEFAULT_DRAM_QUERY);
        let hbm_query = get("HBM_QUERY", DEFAULT_HBM_QUERY);

        let pricing_queries = match lookup("PRICING_QUERIES") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => vec![dram_query.clone(), hbm_query.clone()],
        };

        let config = Self {
            ticker: get("MU_TICKER", "MU").trim().to_uppercase(),
            benchmark_ticker: get("BENCHMARK_TICKER", "SOXX").trim().to_uppercase(),
            lookback_days: get("LOOKBACK_DAYS", "420")
                .parse()
                .context("LOOKBACK_DAYS must be an integer")?,
            sentiment_window_days: get("SENTIMENT_WINDOW_DAYS", "14")
                .parse()
                .context("SENTIMENT_WINDOW_DAYS must be an integer")?,
            news_api_key: lookup("NEWS_API_KEY").filter(|k| !k.trim().is_empty()),
            news_limit: get("NEWS_LIMIT", "30")
                .parse()
                .context("NEWS_LIMIT must be a positive integer")?,
            dram_query,
            ai_capex_query: get("AI_CAPEX_QUERY", DEFAULT_AI_CAPEX_QUERY),
            hbm_query,
            pricing_queries,
            cache_ttl_secs: get("CACHE_TTL_SECS", "600")
                .parse()
                .context("CACHE_TTL_SECS must be an integer")?,
            http_timeout_secs: get("HTTP_TIMEOUT_SECS", "20")
                .parse()
                .context("HTTP_TIMEOUT_SECS must be a positive integer")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            bail!("ticker must not be empty");
        }
        if self.benchmark_ticker.trim().is_empty() {
            bail!("benchmark ticker must not be empty");
        }
        if self.lookback_days <= 0 {
            bail!("lookback_days must be positive, got {}", self.lookback_days);
        }
        if self.sentiment_window_days <= 0 {
            bail!("sentiment_window_days must be positive, got {}", self.sentiment_window_days);
        }
        if self.news_limit == 0 {
            bail!("news_limit must be positive");
        }
        if self.cache_ttl_secs < 0 {
            bail!("cache_ttl_secs must not be negative");
        }
        Ok(())
    }

    /// Themed news queries, in display order.
    pub fn news_queries(&self) -> Vec<String> {
        vec![
            self.dram_query.clone(),
            self.ai_capex_query.clone(),
            self.hbm_query.clone(),
        ]
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
