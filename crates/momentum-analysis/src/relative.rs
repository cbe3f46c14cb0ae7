use cycle_core::{PriceRow, RelativeStrengthRow};
use std::collections::HashMap;

/// Join stock and benchmark closes on date (inner join) and compute
/// `close_stock / close_benchmark`. Dates with a zero benchmark close are dropped.
pub fn relative_performance(stock: &[PriceRow], benchmark: &[PriceRow]) -> Vec<RelativeStrengthRow> {
    let bench_by_date: HashMap<_, f64> = benchmark.iter().map(|row| (row.date, row.close)).collect();

    let mut rows: Vec<RelativeStrengthRow> = stock
        .iter()
        .filter_map(|row| {
            let bench_close = *bench_by_date.get(&row.date)?;
            if bench_close == 0.0 {
                return None;
            }
            Some(RelativeStrengthRow {
                date: row.date,
                close_stock: row.close,
                close_benchmark: bench_close,
                relative_strength: row.close / bench_close,
            })
        })
        .collect();

    rows.sort_by_key(|row| row.date);
    rows
}
