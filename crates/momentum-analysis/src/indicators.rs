use chrono::NaiveDate;
use cycle_core::stats::pct_change;
use cycle_core::PriceRow;
use serde::{Deserialize, Serialize};

/// Trailing windows, in trading days.
pub const RET_1D_PERIOD: usize = 1;
pub const MOM_5D_PERIOD: usize = 5;
/// One-month proxy
pub const MOM_21D_PERIOD: usize = 21;
/// Five-month proxy
pub const MOM_105D_PERIOD: usize = 105;

/// Rows needed before every momentum column is defined on the last row.
pub const MIN_MOMENTUM_ROWS: usize = MOM_105D_PERIOD + 1;

/// Price row with its return-based features. Missing values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ret_1d: Option<f64>,
    pub mom_5d: Option<f64>,
    pub mom_21d: Option<f64>,
    pub mom_105d: Option<f64>,
}

/// Derive return features for every row, relative to the close N rows earlier.
///
/// Rows are sorted by date first; the input order does not matter.
pub fn compute_momentum(prices: &[PriceRow]) -> Vec<MomentumRow> {
    let mut sorted: Vec<&PriceRow> = prices.iter().collect();
    sorted.sort_by_key(|row| row.date);

    let closes: Vec<f64> = sorted.iter().map(|row| row.close).collect();
    let ret_1d = pct_change(&closes, RET_1D_PERIOD);
    let mom_5d = pct_change(&closes, MOM_5D_PERIOD);
    let mom_21d = pct_change(&closes, MOM_21D_PERIOD);
    let mom_105d = pct_change(&closes, MOM_105D_PERIOD);

    tracing::debug!("Computed momentum over {} price rows", closes.len());

    sorted
        .iter()
        .enumerate()
        .map(|(i, row)| MomentumRow {
            date: row.date,
            close: row.close,
            ret_1d: ret_1d[i],
            mom_5d: mom_5d[i],
            mom_21d: mom_21d[i],
            mom_105d: mom_105d[i],
        })
        .collect()
}

/// Last `window` rows of the series, oldest first.
pub fn tail_window(prices: &[PriceRow], window: usize) -> Vec<PriceRow> {
    let mut sorted = prices.to_vec();
    sorted.sort_by_key(|row| row.date);
    let start = sorted.len().saturating_sub(window);
    sorted.split_off(start)
}
