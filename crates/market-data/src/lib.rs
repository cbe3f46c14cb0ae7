pub mod yahoo;

pub use yahoo::{parse_chart, parse_fundamentals_timeseries, YahooFinanceClient};
