use cycle_core::{stats, NewsItem, PricingHeadline};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Most news items scored per batch
pub const MAX_NEWS_TEXTS: usize = 200;
/// Most pricing headlines scored per batch
pub const MAX_PRICING_TEXTS: usize = 80;

/// VADER compound polarity over themed news and pricing headlines.
pub struct SentimentScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Compound polarity of one text, in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }

    /// Mean polarity over the capped news and pricing batches.
    ///
    /// News items contribute `title + ". " + description`, headlines their
    /// text only. Both sets empty yields exactly 0.0.
    pub fn score_batch(&self, news: &[NewsItem], pricing: &[PricingHeadline]) -> f64 {
        let texts: Vec<String> = news
            .iter()
            .take(MAX_NEWS_TEXTS)
            .map(NewsItem::sentiment_text)
            .chain(pricing.iter().take(MAX_PRICING_TEXTS).map(|h| h.headline.clone()))
            .collect();

        if texts.is_empty() {
            return 0.0;
        }

        let scores: Vec<f64> = texts.iter().map(|text| self.polarity(text)).collect();
        let avg = stats::mean(&scores);
        tracing::debug!("Scored {} texts, mean compound {:.4}", scores.len(), avg);
        avg
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPEX_CUT: &str = "Hyperscalers slash AI spending, a disaster for chipmakers";
    const STRONG_QUARTER: &str = "Investors love Micron's fantastic quarter";

    fn news(title: &str, description: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: description.to_string(),
            source: "Reuters".to_string(),
            published: "2025-03-01T00:00:00Z".to_string(),
            url: "https://example.com".to_string(),
            topic: "DRAM spot price trendforce".to_string(),
        }
    }

    fn headline(text: &str) -> PricingHeadline {
        PricingHeadline {
            date: "2025-03-01".to_string(),
            headline: text.to_string(),
            source: "Google News".to_string(),
            url: "https://example.com".to_string(),
            query: "DRAM".to_string(),
        }
    }

    #[test]
    fn test_empty_batches_are_neutral() {
        let scorer = SentimentScorer::new();
        assert_eq!(scorer.score_batch(&[], &[]), 0.0);
    }

    #[test]
    fn test_known_compound_values() {
        let scorer = SentimentScorer::new();
        assert!((scorer.polarity(CAPEX_CUT) - (-0.7351)).abs() < 1e-4);
        assert!((scorer.polarity(STRONG_QUARTER) - 0.8316).abs() < 1e-4);
        assert!((scorer.polarity("Samsung profit plunges as memory chip glut worsens") - (-0.0516)).abs() < 1e-4);
    }

    #[test]
    fn test_polarity_bounded() {
        let scorer = SentimentScorer::new();
        let p = scorer.polarity("great great great excellent amazing wonderful love!!!!");
        assert!(p > 0.9 && p <= 1.0);
        let n = scorer.polarity("terrible horrible disaster awful crisis hate");
        assert!(n < -0.9 && n >= -1.0);
    }

    #[test]
    fn test_negation_flips_sign() {
        let scorer = SentimentScorer::new();
        assert!(scorer.polarity("demand is strong") > 0.0);
        assert!(scorer.polarity("demand is not strong") < 0.0);
    }

    #[test]
    fn test_batch_is_mean_of_items() {
        let scorer = SentimentScorer::new();
        let items = vec![news(STRONG_QUARTER, "")];
        let heads = vec![headline(CAPEX_CUT)];
        let expected = (scorer.polarity(&format!("{}. ", STRONG_QUARTER)) + scorer.polarity(CAPEX_CUT)) / 2.0;
        assert!((scorer.score_batch(&items, &heads) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_caps_ignore_excess_items() {
        let scorer = SentimentScorer::new();
        let mut items: Vec<NewsItem> = (0..MAX_NEWS_TEXTS).map(|_| news(STRONG_QUARTER, "")).collect();
        items.push(news(CAPEX_CUT, ""));
        let capped = scorer.score_batch(&items, &[]);
        assert!((capped - scorer.polarity(&format!("{}. ", STRONG_QUARTER))).abs() < 1e-12);

        let mut heads: Vec<PricingHeadline> = (0..MAX_PRICING_TEXTS).map(|_| headline(CAPEX_CUT)).collect();
        heads.push(headline(STRONG_QUARTER));
        let capped = scorer.score_batch(&[], &heads);
        assert!((capped - scorer.polarity(CAPEX_CUT)).abs() < 1e-12);
    }
}
