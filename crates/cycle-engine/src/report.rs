use cycle_core::CycleError;
use fundamental_analysis::{FundamentalFeatures, MIN_FUNDAMENTAL_ROWS};
use momentum_analysis::{MomentumRow, MIN_MOMENTUM_ROWS, MOM_21D_PERIOD};
use serde::{Deserialize, Serialize};
use std::fmt;

// Score weights
pub const MOMENTUM_1M_WEIGHT: f64 = 0.45;
pub const MOMENTUM_5M_WEIGHT: f64 = 0.20;
pub const SENTIMENT_WEIGHT: f64 = 0.20;
pub const INVENTORY_GROWTH_WEIGHT: f64 = 0.10;
pub const CAPEX_ACCELERATION_WEIGHT: f64 = 0.05;

/// |score| beyond this leaves the neutral band
pub const TREND_THRESHOLD: f64 = 0.05;

// Alert triggers
pub const INVENTORY_ALERT_THRESHOLD: f64 = 0.08;
pub const CAPEX_ALERT_THRESHOLD: f64 = 0.15;
pub const SENTIMENT_ALERT_THRESHOLD: f64 = -0.15;
pub const MOMENTUM_ALERT_THRESHOLD: f64 = -0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Neutral,
    Bearish,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Bullish => "Bullish",
            Trend::Neutral => "Neutral",
            Trend::Bearish => "Bearish",
        };
        write!(f, "{}", label)
    }
}

/// The five numbers a report is derived from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleInputs {
    pub momentum_1m: f64,
    pub momentum_5m: f64,
    pub capex_acceleration: f64,
    pub inventory_growth: f64,
    pub sentiment: f64,
}

/// Weighted composite of the cycle inputs.
pub fn cycle_score(inputs: &CycleInputs) -> f64 {
    MOMENTUM_1M_WEIGHT * inputs.momentum_1m
        + MOMENTUM_5M_WEIGHT * inputs.momentum_5m
        + SENTIMENT_WEIGHT * inputs.sentiment
        - INVENTORY_GROWTH_WEIGHT * inputs.inventory_growth
        - CAPEX_ACCELERATION_WEIGHT * inputs.capex_acceleration
}

pub fn classify_trend(score: f64) -> Trend {
    if score > TREND_THRESHOLD {
        Trend::Bullish
    } else if score < -TREND_THRESHOLD {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

/// Threshold alerts in fixed order. Each is evaluated independently.
pub fn cycle_alerts(ticker: &str, inputs: &CycleInputs) -> Vec<String> {
    let mut alerts = Vec::new();
    if inputs.inventory_growth > INVENTORY_ALERT_THRESHOLD {
        alerts.push("Rising inventory detected (>8% QoQ).".to_string());
    }
    if inputs.capex_acceleration > CAPEX_ALERT_THRESHOLD {
        alerts.push("Capex acceleration is high; monitor oversupply risk.".to_string());
    }
    if inputs.sentiment < SENTIMENT_ALERT_THRESHOLD {
        alerts.push("Negative sentiment flow across DRAM/AI capex news.".to_string());
    }
    if inputs.momentum_1m < MOMENTUM_ALERT_THRESHOLD {
        alerts.push(format!("{} short-term momentum has turned bearish.", ticker));
    }
    alerts
}

/// Immutable summary of one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    ticker: String,
    score: f64,
    trend: Trend,
    alerts: Vec<String>,
    momentum_1m: f64,
    momentum_5m: f64,
    capex_acceleration: f64,
    inventory_growth: f64,
    sentiment: f64,
}

impl CycleReport {
    pub fn from_inputs(ticker: &str, inputs: CycleInputs) -> Self {
        let score = cycle_score(&inputs);
        Self {
            ticker: ticker.to_string(),
            score,
            trend: classify_trend(score),
            alerts: cycle_alerts(ticker, &inputs),
            momentum_1m: inputs.momentum_1m,
            momentum_5m: inputs.momentum_5m,
            capex_acceleration: inputs.capex_acceleration,
            inventory_growth: inputs.inventory_growth,
            sentiment: inputs.sentiment,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn momentum_1m(&self) -> f64 {
        self.momentum_1m
    }

    pub fn momentum_5m(&self) -> f64 {
        self.momentum_5m
    }

    pub fn capex_acceleration(&self) -> f64 {
        self.capex_acceleration
    }

    pub fn inventory_growth(&self) -> f64 {
        self.inventory_growth
    }

    pub fn sentiment(&self) -> f64 {
        self.sentiment
    }
}

fn require(
    value: Option<f64>,
    feature: &'static str,
    required: usize,
    available: usize,
) -> Result<f64, CycleError> {
    value
        .filter(|v| v.is_finite())
        .ok_or(CycleError::InsufficientHistory {
            feature,
            required,
            available,
        })
}

/// Build a report from the latest momentum and fundamentals rows.
///
/// Any missing or non-finite history feature fails with `InsufficientHistory`
/// naming it, and a non-finite sentiment with `SchemaMismatch`. Nothing is
/// defaulted to zero.
pub fn build_report(
    ticker: &str,
    momentum: &[MomentumRow],
    fundamentals: &[FundamentalFeatures],
    sentiment: f64,
) -> Result<CycleReport, CycleError> {
    if !sentiment.is_finite() {
        return Err(CycleError::SchemaMismatch(format!(
            "sentiment score is not a finite number: {}",
            sentiment
        )));
    }

    let latest_momentum = momentum.last();
    let latest_fundamentals = fundamentals.last();

    let inputs = CycleInputs {
        momentum_1m: require(
            latest_momentum.and_then(|row| row.mom_21d),
            "momentum_1m",
            MOM_21D_PERIOD + 1,
            momentum.len(),
        )?,
        momentum_5m: require(
            latest_momentum.and_then(|row| row.mom_105d),
            "momentum_5m",
            MIN_MOMENTUM_ROWS,
            momentum.len(),
        )?,
        capex_acceleration: require(
            latest_fundamentals.and_then(|row| row.capex_acceleration),
            "capex_acceleration",
            MIN_FUNDAMENTAL_ROWS,
            fundamentals.len(),
        )?,
        inventory_growth: require(
            latest_fundamentals.and_then(|row| row.inventory_growth),
            "inventory_growth",
            2,
            fundamentals.len(),
        )?,
        sentiment,
    };

    Ok(CycleReport::from_inputs(ticker, inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cycle_core::{FundamentalRow, PriceRow};
    use fundamental_analysis::detect_capex_acceleration;
    use momentum_analysis::compute_momentum;

    fn prices(n: usize) -> Vec<PriceRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = (i + 1) as f64;
                PriceRow {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1_000.0,
                }
            })
            .collect()
    }

    fn fundamentals() -> Vec<FundamentalRow> {
        let start = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        [(100.0, 10.0), (110.0, 11.0), (115.0, 14.0), (120.0, 20.0), (132.0, 28.0)]
            .iter()
            .enumerate()
            .map(|(i, (inv, capex))| {
                FundamentalRow::new(start + chrono::Duration::days(91 * i as i64), *inv, *capex)
            })
            .collect()
    }

    #[test]
    fn test_all_zero_inputs_neutral_without_alerts() {
        let report = CycleReport::from_inputs("MU", CycleInputs::default());
        assert_eq!(report.score(), 0.0);
        assert_eq!(report.trend(), Trend::Neutral);
        assert!(report.alerts().is_empty());
    }

    #[test]
    fn test_only_inventory_alert_fires() {
        let inputs = CycleInputs {
            inventory_growth: 0.09,
            capex_acceleration: 0.02,
            ..Default::default()
        };
        let report = CycleReport::from_inputs("MU", inputs);
        assert_eq!(report.alerts(), &["Rising inventory detected (>8% QoQ).".to_string()]);
    }

    #[test]
    fn test_alerts_keep_fixed_order() {
        let inputs = CycleInputs {
            momentum_1m: -0.20,
            momentum_5m: 0.0,
            capex_acceleration: 0.30,
            inventory_growth: 0.12,
            sentiment: -0.40,
        };
        let report = CycleReport::from_inputs("MU", inputs);
        assert_eq!(
            report.alerts(),
            &[
                "Rising inventory detected (>8% QoQ).".to_string(),
                "Capex acceleration is high; monitor oversupply risk.".to_string(),
                "Negative sentiment flow across DRAM/AI capex news.".to_string(),
                "MU short-term momentum has turned bearish.".to_string(),
            ]
        );
        assert_eq!(report.trend(), Trend::Bearish);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let inputs = CycleInputs {
            inventory_growth: INVENTORY_ALERT_THRESHOLD,
            capex_acceleration: CAPEX_ALERT_THRESHOLD,
            sentiment: SENTIMENT_ALERT_THRESHOLD,
            momentum_1m: MOMENTUM_ALERT_THRESHOLD,
            momentum_5m: 0.0,
        };
        assert!(cycle_alerts("MU", &inputs).is_empty());
        assert_eq!(classify_trend(TREND_THRESHOLD), Trend::Neutral);
        assert_eq!(classify_trend(-TREND_THRESHOLD), Trend::Neutral);
        assert_eq!(classify_trend(0.051), Trend::Bullish);
        assert_eq!(classify_trend(-0.051), Trend::Bearish);
    }

    #[test]
    fn test_momentum_alert_names_ticker() {
        let inputs = CycleInputs {
            momentum_1m: -0.10,
            ..Default::default()
        };
        assert_eq!(cycle_alerts("WDC", &inputs), vec!["WDC short-term momentum has turned bearish.".to_string()]);
    }

    #[test]
    fn test_score_weights() {
        let inputs = CycleInputs {
            momentum_1m: 0.10,
            momentum_5m: 0.20,
            capex_acceleration: 0.40,
            inventory_growth: 0.30,
            sentiment: 0.50,
        };
        let expected = 0.045 + 0.04 + 0.10 - 0.03 - 0.02;
        assert!((cycle_score(&inputs) - expected).abs() < 1e-12);
        assert_eq!(classify_trend(cycle_score(&inputs)), Trend::Bullish);
    }

    #[test]
    fn test_build_report_deterministic() {
        let momentum = compute_momentum(&prices(130));
        let features = detect_capex_acceleration(&fundamentals());
        let first = build_report("MU", &momentum, &features, 0.12).unwrap();
        let second = build_report("MU", &momentum, &features, 0.12).unwrap();
        assert_eq!(first.score().to_bits(), second.score().to_bits());
        assert_eq!(first, second);
        assert!((first.momentum_1m() - (130.0 / 109.0 - 1.0)).abs() < 1e-12);
        assert!((first.inventory_growth() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_short_price_history_is_insufficient() {
        let momentum = compute_momentum(&prices(60));
        let features = detect_capex_acceleration(&fundamentals());
        let err = build_report("MU", &momentum, &features, 0.0).unwrap_err();
        assert_eq!(
            err,
            CycleError::InsufficientHistory {
                feature: "momentum_5m",
                required: MIN_MOMENTUM_ROWS,
                available: 60,
            }
        );
    }

    #[test]
    fn test_empty_inputs_are_insufficient() {
        let err = build_report("MU", &[], &[], 0.0).unwrap_err();
        assert!(matches!(err, CycleError::InsufficientHistory { feature: "momentum_1m", available: 0, .. }));

        let momentum = compute_momentum(&prices(130));
        let features = detect_capex_acceleration(&fundamentals()[..2]);
        let err = build_report("MU", &momentum, &features, 0.0).unwrap_err();
        assert!(matches!(err, CycleError::InsufficientHistory { feature: "capex_acceleration", .. }));
    }

    #[test]
    fn test_non_finite_sentiment_rejected() {
        let momentum = compute_momentum(&prices(130));
        let features = detect_capex_acceleration(&fundamentals());
        let err = build_report("MU", &momentum, &features, f64::NAN).unwrap_err();
        assert!(matches!(err, CycleError::SchemaMismatch(ref msg) if msg.contains("sentiment")));
        assert!(!err.to_string().contains("need 1 rows"));

        let err = build_report("MU", &momentum, &features, f64::INFINITY).unwrap_err();
        assert!(matches!(err, CycleError::SchemaMismatch(_)));
    }

    #[test]
    fn test_trend_serializes_as_string() {
        let report = CycleReport::from_inputs("MU", CycleInputs::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["trend"], "Neutral");
        assert_eq!(json["ticker"], "MU");
        assert!(json["alerts"].as_array().unwrap().is_empty());
    }
}
