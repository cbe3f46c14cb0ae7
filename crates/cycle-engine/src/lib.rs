use chrono::Utc;
use cycle_core::{
    CycleError, FundamentalsProvider, NewsItem, NewsProvider, PriceHistoryProvider, PricingHeadline,
    PricingHeadlineProvider,
};
use fundamental_analysis::detect_capex_acceleration;
use market_data::YahooFinanceClient;
use momentum_analysis::{compute_momentum, relative_performance};
use news_feeds::{GoogleNewsPricingScraper, GoogleNewsRssClient, NewsApiClient};
use sentiment_analysis::SentimentScorer;
use std::sync::Arc;

pub mod cache;
pub mod config;
pub mod report;
pub mod snapshot;

pub use cache::{SnapshotCache, SnapshotKey};
pub use config::CycleConfig;
pub use report::{build_report, CycleInputs, CycleReport, Trend};
pub use snapshot::MarketSnapshot;

/// Data sources used by the engine, selected by configuration.
#[derive(Clone)]
pub struct Providers {
    pub prices: Arc<dyn PriceHistoryProvider>,
    pub fundamentals: Arc<dyn FundamentalsProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub pricing: Arc<dyn PricingHeadlineProvider>,
}

impl Providers {
    /// Yahoo Finance for market data; NewsAPI when a key is configured,
    /// Google News RSS otherwise.
    pub fn from_config(config: &CycleConfig) -> Result<Self, CycleError> {
        let timeout = config.http_timeout();
        let yahoo = Arc::new(YahooFinanceClient::new(timeout)?);

        let news: Arc<dyn NewsProvider> = match &config.news_api_key {
            Some(key) => Arc::new(NewsApiClient::new(key.clone(), timeout)?),
            None => Arc::new(GoogleNewsRssClient::new(timeout)?),
        };

        Ok(Self {
            prices: yahoo.clone(),
            fundamentals: yahoo,
            news,
            pricing: Arc::new(GoogleNewsPricingScraper::new(timeout)?),
        })
    }
}

pub struct CycleEngine {
    config: CycleConfig,
    providers: Providers,
    scorer: SentimentScorer,
    cache: SnapshotCache,
}

impl CycleEngine {
    pub fn new(config: CycleConfig, providers: Providers) -> Self {
        let cache = SnapshotCache::new(config.cache_ttl_secs);
        Self {
            config,
            providers,
            scorer: SentimentScorer::new(),
            cache,
        }
    }

    pub fn from_config(config: CycleConfig) -> Result<Self, CycleError> {
        let providers = Providers::from_config(&config)?;
        tracing::info!("News backend: {}", providers.news.backend_name());
        Ok(Self::new(config, providers))
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Fetch everything one refresh needs, one provider call at a time.
    ///
    /// Price, benchmark and fundamentals failures propagate. News and
    /// pricing headline failures are logged and leave those sets empty.
    pub async fn load_all_data(&self) -> Result<MarketSnapshot, CycleError> {
        let config = &self.config;
        tracing::info!(
            "Loading data for {} vs {} ({} days)",
            config.ticker,
            config.benchmark_ticker,
            config.lookback_days
        );

        let price = self
            .providers
            .prices
            .get_price_history(&config.ticker, config.lookback_days)
            .await?;
        tracing::debug!("{} price rows for {}", price.len(), config.ticker);

        let benchmark = self
            .providers
            .prices
            .get_price_history(&config.benchmark_ticker, config.lookback_days)
            .await?;
        let relative = relative_performance(&price, &benchmark);
        tracing::debug!("{} relative strength rows vs {}", relative.len(), config.benchmark_ticker);

        let fundamentals = self
            .providers
            .fundamentals
            .get_inventory_and_capex(&config.ticker)
            .await?;
        tracing::debug!("{} fundamentals rows for {}", fundamentals.len(), config.ticker);

        let news = self.fetch_themed_news().await;
        let pricing = self.fetch_pricing_headlines().await;

        tracing::info!(
            "Loaded {} price rows, {} quarters, {} news items, {} pricing headlines",
            price.len(),
            fundamentals.len(),
            news.len(),
            pricing.len()
        );

        Ok(MarketSnapshot {
            ticker: config.ticker.clone(),
            benchmark: config.benchmark_ticker.clone(),
            price,
            relative,
            fundamentals,
            news,
            pricing,
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_themed_news(&self) -> Vec<NewsItem> {
        let mut news = Vec::new();
        for query in self.config.news_queries() {
            match self
                .providers
                .news
                .fetch_news(&query, self.config.sentiment_window_days, self.config.news_limit)
                .await
            {
                Ok(items) => news.extend(items),
                Err(e) => tracing::warn!(
                    "News query '{}' failed on {}: {}",
                    query,
                    self.providers.news.backend_name(),
                    e
                ),
            }
        }
        news
    }

    async fn fetch_pricing_headlines(&self) -> Vec<PricingHeadline> {
        match self
            .providers
            .pricing
            .collect_dram_price_signals(&self.config.pricing_queries)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Pricing headline scrape failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Derive the cycle report from a snapshot. Pure over the snapshot contents.
    pub fn build_report(&self, snapshot: &MarketSnapshot) -> Result<CycleReport, CycleError> {
        let momentum = compute_momentum(&snapshot.price);
        let features = detect_capex_acceleration(&snapshot.fundamentals);
        let sentiment = self.scorer.score_batch(&snapshot.news, &snapshot.pricing);
        build_report(&snapshot.ticker, &momentum, &features, sentiment)
    }

    /// Snapshot for the configured key, reusing a fresh cached one when present.
    pub async fn snapshot(&self) -> Result<Arc<MarketSnapshot>, CycleError> {
        let key = SnapshotCache::key(
            &self.config.ticker,
            &self.config.benchmark_ticker,
            self.config.lookback_days,
        );
        if let Some(snapshot) = self.cache.get(&key) {
            return Ok(snapshot);
        }

        let snapshot = Arc::new(self.load_all_data().await?);
        self.cache.insert(key, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// One refresh: snapshot (cached within the TTL) plus its report.
    pub async fn refresh(&self) -> Result<(Arc<MarketSnapshot>, CycleReport), CycleError> {
        let snapshot = self.snapshot().await?;
        let report = self.build_report(&snapshot)?;
        tracing::info!(
            "{} cycle score {:.4} ({}), {} alert(s)",
            report.ticker(),
            report.score(),
            report.trend(),
            report.alerts().len()
        );
        Ok((snapshot, report))
    }
}
