use chrono::NaiveDate;
use cycle_core::stats::{diff, pct_change};
use cycle_core::FundamentalRow;
use serde::{Deserialize, Serialize};

/// Rows needed before `capex_acceleration` is defined on the last row.
pub const MIN_FUNDAMENTAL_ROWS: usize = 3;

/// Quarterly statement row with growth features. Missing values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalFeatures {
    pub date: NaiveDate,
    pub inventory: f64,
    pub capex: f64,
    /// Quarter-over-quarter relative change in capex
    pub capex_growth: Option<f64>,
    /// Quarter-over-quarter relative change in inventory
    pub inventory_growth: Option<f64>,
    /// Change in the capex growth rate (not in the level)
    pub capex_acceleration: Option<f64>,
}

/// Derive capex/inventory growth and capex acceleration for every quarter.
///
/// Rows are sorted by date first. Row 0 has no growth values and rows 0-1
/// have no acceleration.
pub fn detect_capex_acceleration(rows: &[FundamentalRow]) -> Vec<FundamentalFeatures> {
    let mut sorted: Vec<&FundamentalRow> = rows.iter().collect();
    sorted.sort_by_key(|row| row.date);

    let capex: Vec<f64> = sorted.iter().map(|row| row.capex).collect();
    let inventory: Vec<f64> = sorted.iter().map(|row| row.inventory).collect();

    let capex_growth = pct_change(&capex, 1);
    let inventory_growth = pct_change(&inventory, 1);
    let capex_acceleration = diff(&capex_growth);

    tracing::debug!("Computed fundamentals features over {} quarters", sorted.len());

    sorted
        .iter()
        .enumerate()
        .map(|(i, row)| FundamentalFeatures {
            date: row.date,
            inventory: row.inventory,
            capex: row.capex,
            capex_growth: capex_growth[i],
            inventory_growth: inventory_growth[i],
            capex_acceleration: capex_acceleration[i],
        })
        .collect()
}
