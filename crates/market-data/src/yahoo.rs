use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use cycle_core::{CycleError, FundamentalRow, FundamentalsProvider, PriceHistoryProvider, PriceRow};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const TIMESERIES_URL: &str = "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Balance-sheet names that carry inventory, in preference order
pub const INVENTORY_ALIASES: &[&str] = &["Inventory", "InventoriesAndSupplies"];
/// Cash-flow names that carry capital expenditure, in preference order
pub const CAPEX_ALIASES: &[&str] = &["CapitalExpenditure", "CapitalExpenditures"];

const STATEMENT_LOOKBACK_DAYS: i64 = 5 * 365;

/// Yahoo Finance backed price and statement provider.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Result<Self, CycleError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CycleError::Provider(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, CycleError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CycleError::http_status("Yahoo Finance", status.as_u16(), &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CycleError::Parse(e.to_string()))
    }
}

fn request_error(e: reqwest::Error) -> CycleError {
    CycleError::transport("Yahoo Finance", e.is_timeout(), &e.to_string())
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn get_price_history(&self, ticker: &str, lookback_days: i64) -> Result<Vec<PriceRow>, CycleError> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(lookback_days);
        let url = format!("{}/{}", CHART_URL, ticker);

        let json = self
            .get_json(
                &url,
                &[
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                    ("interval", "1d".to_string()),
                    ("events", "history".to_string()),
                ],
            )
            .await?;

        let rows = parse_chart(&json, ticker)?;
        tracing::debug!("Fetched {} daily rows for {}", rows.len(), ticker);
        Ok(rows)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFinanceClient {
    async fn get_inventory_and_capex(&self, ticker: &str) -> Result<Vec<FundamentalRow>, CycleError> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(STATEMENT_LOOKBACK_DAYS);
        let types: Vec<String> = INVENTORY_ALIASES
            .iter()
            .chain(CAPEX_ALIASES)
            .map(|name| format!("quarterly{}", name))
            .collect();
        let url = format!("{}/{}", TIMESERIES_URL, ticker);

        let json = self
            .get_json(
                &url,
                &[
                    ("symbol", ticker.to_string()),
                    ("type", types.join(",")),
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                ],
            )
            .await?;

        let rows = parse_fundamentals_timeseries(&json, ticker)?;
        tracing::debug!("Fetched {} quarterly statement rows for {}", rows.len(), ticker);
        Ok(rows)
    }
}

/// Parse a v8 chart response into ascending daily rows.
///
/// OHLC is scaled by `adjclose / close` when the response carries an adjusted
/// close. Days with any null field are skipped; duplicate dates keep the last row.
pub fn parse_chart(json: &Value, ticker: &str) -> Result<Vec<PriceRow>, CycleError> {
    let chart = json
        .get("chart")
        .ok_or_else(|| CycleError::SchemaMismatch("Missing 'chart' object".to_string()))?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(CycleError::DataUnavailable(format!(
            "No market data returned for {}: {}",
            ticker, description
        )));
    }

    let result = chart
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| CycleError::DataUnavailable(format!("No market data returned for {}", ticker)))?;

    let timestamps = match result.get("timestamp").and_then(|v| v.as_array()) {
        Some(ts) if !ts.is_empty() => ts,
        _ => {
            return Err(CycleError::DataUnavailable(format!(
                "No market data returned for {}",
                ticker
            )))
        }
    };

    let quote = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| CycleError::SchemaMismatch("Missing quote indicators".to_string()))?;

    let required = ["open", "high", "low", "close", "volume"];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| quote.get(*field).and_then(|v| v.as_array()).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(CycleError::SchemaMismatch(format!(
            "Missing expected market fields: {:?}",
            missing
        )));
    }

    let column = |field: &str| -> Vec<Option<f64>> {
        quote
            .get(field)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
            .unwrap_or_default()
    };
    let opens = column("open");
    let highs = column("high");
    let lows = column("low");
    let closes = column("close");
    let volumes = column("volume");

    let adjcloses: Option<Vec<Option<f64>>> = result
        .get("indicators")
        .and_then(|v| v.get("adjclose"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("adjclose"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(|v| v.as_f64()).collect());

    let mut by_date: BTreeMap<NaiveDate, PriceRow> = BTreeMap::new();

    for (i, ts) in timestamps.iter().enumerate() {
        let fields = (
            ts.as_i64(),
            opens.get(i).copied().flatten(),
            highs.get(i).copied().flatten(),
            lows.get(i).copied().flatten(),
            closes.get(i).copied().flatten(),
            volumes.get(i).copied().flatten(),
        );
        let (Some(ts), Some(o), Some(h), Some(l), Some(c), Some(v)) = fields else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        let factor = adjcloses
            .as_ref()
            .and_then(|adj| adj.get(i).copied().flatten())
            .filter(|_| c != 0.0)
            .map(|adj| adj / c)
            .unwrap_or(1.0);

        by_date.insert(
            date,
            PriceRow {
                date,
                open: o * factor,
                high: h * factor,
                low: l * factor,
                close: c * factor,
                volume: v,
            },
        );
    }

    if by_date.is_empty() {
        return Err(CycleError::DataUnavailable(format!(
            "No complete price rows returned for {}",
            ticker
        )));
    }

    Ok(by_date.into_values().collect())
}

/// Parse a fundamentals-timeseries response into ascending quarterly rows.
///
/// Inventory and capex are each taken from the first alias that carries data,
/// then inner-joined on statement date.
pub fn parse_fundamentals_timeseries(json: &Value, ticker: &str) -> Result<Vec<FundamentalRow>, CycleError> {
    let results = json
        .get("timeseries")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            CycleError::DataUnavailable(format!("Unable to load financial statements for {}", ticker))
        })?;

    let mut series: HashMap<String, BTreeMap<NaiveDate, f64>> = HashMap::new();
    for entry in results {
        let Some(type_name) = entry
            .get("meta")
            .and_then(|m| m.get("type"))
            .and_then(|t| t.as_array())
            .and_then(|arr| arr.first())
            .and_then(|t| t.as_str())
        else {
            continue;
        };

        let points: BTreeMap<NaiveDate, f64> = entry
            .get(type_name)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|point| {
                        let date = point
                            .get("asOfDate")
                            .and_then(|d| d.as_str())
                            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
                        let value = point
                            .get("reportedValue")
                            .and_then(|r| r.get("raw"))
                            .and_then(|r| r.as_f64())?;
                        Some((date, value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        if !points.is_empty() {
            let name = type_name.strip_prefix("quarterly").unwrap_or(type_name);
            series.insert(name.to_string(), points);
        }
    }

    let inventory = pick_first(&series, INVENTORY_ALIASES)?;
    let capex = pick_first(&series, CAPEX_ALIASES)?;

    let rows: Vec<FundamentalRow> = inventory
        .iter()
        .filter_map(|(date, &inv)| capex.get(date).map(|&c| FundamentalRow::new(*date, inv, c)))
        .collect();

    if rows.is_empty() {
        return Err(CycleError::DataUnavailable(format!(
            "No quarters with both inventory and capex for {}",
            ticker
        )));
    }

    Ok(rows)
}

fn pick_first<'a>(
    series: &'a HashMap<String, BTreeMap<NaiveDate, f64>>,
    aliases: &[&str],
) -> Result<&'a BTreeMap<NaiveDate, f64>, CycleError> {
    aliases
        .iter()
        .find_map(|alias| series.get(*alias))
        .ok_or_else(|| {
            CycleError::DataUnavailable(format!("None of the expected fields found: {:?}", aliases))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_fixture() -> Value {
        // 2025-01-02, 2025-01-03, 2025-01-06 at 14:30 UTC
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "MU" },
                    "timestamp": [1735828200, 1735914600, 1736173800],
                    "indicators": {
                        "quote": [{
                            "open":   [90.0, 92.0, null],
                            "high":   [93.0, 95.0, 99.0],
                            "low":    [89.0, 91.0, 96.0],
                            "close":  [92.0, 94.0, 98.0],
                            "volume": [1000, 2000, 3000]
                        }],
                        "adjclose": [{ "adjclose": [46.0, 47.0, 49.0] }]
                    }
                }],
                "error": null
            }
        })
    }

    fn point(date: &str, raw: f64) -> Value {
        json!({ "asOfDate": date, "periodType": "3M", "reportedValue": { "raw": raw } })
    }

    #[test]
    fn test_parse_chart_adjusts_and_skips_null_rows() {
        let rows = parse_chart(&chart_fixture(), "MU").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!((rows[0].close - 46.0).abs() < 1e-9);
        assert!((rows[0].open - 45.0).abs() < 1e-9);
        assert_eq!(rows[1].volume, 2000.0);
        assert!(rows[0].date < rows[1].date);
    }

    #[test]
    fn test_parse_chart_without_adjclose_keeps_raw_prices() {
        let mut fixture = chart_fixture();
        fixture["chart"]["result"][0]["indicators"]
            .as_object_mut()
            .unwrap()
            .remove("adjclose");
        let rows = parse_chart(&fixture, "MU").unwrap();
        assert_eq!(rows[0].close, 92.0);
    }

    #[test]
    fn test_parse_chart_missing_field_is_schema_mismatch() {
        let mut fixture = chart_fixture();
        fixture["chart"]["result"][0]["indicators"]["quote"][0]
            .as_object_mut()
            .unwrap()
            .remove("volume");
        let err = parse_chart(&fixture, "MU").unwrap_err();
        assert!(matches!(err, CycleError::SchemaMismatch(msg) if msg.contains("volume")));
    }

    #[test]
    fn test_parse_chart_error_payload_is_unavailable() {
        let fixture = json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found" } }
        });
        let err = parse_chart(&fixture, "ZZZZ").unwrap_err();
        assert!(matches!(err, CycleError::DataUnavailable(_)));
    }

    #[test]
    fn test_parse_chart_empty_timestamps_is_unavailable() {
        let fixture = json!({ "chart": { "result": [{ "timestamp": [], "indicators": { "quote": [{}] } }], "error": null } });
        assert!(matches!(parse_chart(&fixture, "MU"), Err(CycleError::DataUnavailable(_))));
    }

    #[test]
    fn test_parse_fundamentals_joins_and_normalizes_capex() {
        let fixture = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": { "symbol": ["MU"], "type": ["quarterlyInventory"] },
                        "quarterlyInventory": [
                            point("2024-05-31", 8_100.0),
                            point("2024-02-29", 8_300.0),
                            null,
                            point("2024-08-31", 8_500.0)
                        ]
                    },
                    {
                        "meta": { "symbol": ["MU"], "type": ["quarterlyCapitalExpenditure"] },
                        "quarterlyCapitalExpenditure": [
                            point("2024-02-29", -1_200.0),
                            point("2024-05-31", -1_900.0),
                            point("2024-08-31", -2_100.0)
                        ]
                    }
                ],
                "error": null
            }
        });

        let rows = parse_fundamentals_timeseries(&fixture, "MU").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(rows[0].inventory, 8_300.0);
        assert_eq!(rows[0].capex, 1_200.0);
        assert_eq!(rows[2].capex, 2_100.0);
    }

    #[test]
    fn test_parse_fundamentals_uses_alias() {
        let fixture = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": { "type": ["quarterlyInventoriesAndSupplies"] },
                        "quarterlyInventoriesAndSupplies": [point("2024-02-29", 10.0)]
                    },
                    {
                        "meta": { "type": ["quarterlyCapitalExpenditures"] },
                        "quarterlyCapitalExpenditures": [point("2024-02-29", -3.0)]
                    }
                ]
            }
        });

        let rows = parse_fundamentals_timeseries(&fixture, "MU").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].capex, 3.0);
    }

    #[test]
    fn test_parse_fundamentals_missing_capex_is_unavailable() {
        let fixture = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": { "type": ["quarterlyInventory"] },
                        "quarterlyInventory": [point("2024-02-29", 10.0)]
                    },
                    { "meta": { "type": ["quarterlyCapitalExpenditure"] } }
                ]
            }
        });

        let err = parse_fundamentals_timeseries(&fixture, "MU").unwrap_err();
        assert!(matches!(err, CycleError::DataUnavailable(msg) if msg.contains("CapitalExpenditure")));
    }
}
