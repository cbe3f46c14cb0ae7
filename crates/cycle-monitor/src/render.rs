//! Plain-text dashboard. Every function returns a string so the layout can be
//! checked without a terminal.

use cycle_core::{sort_news_by_published_desc, NewsItem, PriceRow, PricingHeadline, RelativeStrengthRow};
use cycle_engine::{CycleReport, MarketSnapshot};
use momentum_analysis::tail_window;
use std::fmt::Write;

/// Price window label -> trailing trading days
pub const PRICE_WINDOWS: &[(&str, usize)] = &[
    ("1 Day", 1),
    ("5 Days", 5),
    ("1 Month", 21),
    ("5 Months", 105),
    ("1 Year", 252),
];

pub const DEFAULT_WINDOW: &str = "1 Month";

const NO_ALERTS: &str = "No critical triggers fired.";
const NO_NEWS: &str = "No recent themed news items returned from the configured sources.";
const NO_PRICING: &str = "Could not scrape DRAM/HBM signal headlines in this run.";

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const TITLE_WIDTH: usize = 80;

/// Resolve a window label. Accepts the full label or its short form (`1M`, `1Y`, ...).
pub fn resolve_window(label: &str) -> Option<(&'static str, usize)> {
    let wanted = label.trim().to_lowercase();
    PRICE_WINDOWS.iter().copied().find(|(name, _)| {
        let short: String = name
            .split_whitespace()
            .map(|part| part.chars().next().unwrap_or_default())
            .collect();
        name.to_lowercase() == wanted || short.to_lowercase() == wanted
    })
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

pub fn render_metrics(report: &CycleReport) -> String {
    format!(
        "Cycle Trend: {}   Composite Score: {:.2}   1M Momentum: {:.1}%   Sentiment: {:.2}",
        report.trend(),
        report.score(),
        report.momentum_1m() * 100.0,
        report.sentiment()
    )
}

pub fn render_alerts(report: &CycleReport) -> String {
    if report.alerts().is_empty() {
        return NO_ALERTS.to_string();
    }
    report
        .alerts()
        .iter()
        .map(|alert| format!("! {}", alert))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= 0.0 || !span.is_finite() {
                SPARK_BARS[SPARK_BARS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_BARS.len() - 1) as f64).round() as usize;
                SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
            }
        })
        .collect()
}

/// Trailing price window with its change and a sparkline.
pub fn render_price_window(ticker: &str, prices: &[PriceRow], label: &str, rows: usize) -> String {
    let window = tail_window(prices, rows);

    let (first, last) = match (window.first(), window.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return format!("{} Price ({}): no data", ticker, label),
    };

    let closes: Vec<f64> = window.iter().map(|row| row.close).collect();
    let change = if first.close != 0.0 {
        format!("{:+.1}%", (last.close / first.close - 1.0) * 100.0)
    } else {
        "n/a".to_string()
    };

    format!(
        "{} Price ({}): {:.2} on {} ({} since {})\n{}",
        ticker,
        label,
        last.close,
        last.date,
        change,
        first.date,
        sparkline(&closes)
    )
}

pub fn render_relative(benchmark: &str, relative: &[RelativeStrengthRow]) -> String {
    match relative.last() {
        Some(row) => format!(
            "Relative strength vs {}: {:.4} ({:.2} / {:.2} on {})",
            benchmark, row.relative_strength, row.close_stock, row.close_benchmark, row.date
        ),
        None => format!("Relative strength vs {}: no overlapping dates", benchmark),
    }
}

pub fn render_factors(report: &CycleReport) -> String {
    let factors = [
        ("Momentum 1M", report.momentum_1m()),
        ("Momentum 5M", report.momentum_5m()),
        ("Capex Acceleration", report.capex_acceleration()),
        ("Inventory Growth", report.inventory_growth()),
        ("Sentiment", report.sentiment()),
    ];

    let mut out = format!("{:<20} {:>10}", "Factor", "Value");
    for (name, value) in factors {
        let _ = write!(out, "\n{:<20} {:>10.4}", name, value);
    }
    out
}

/// News table, newest first.
pub fn render_news(news: &[NewsItem]) -> String {
    if news.is_empty() {
        return NO_NEWS.to_string();
    }

    let mut sorted = news.to_vec();
    sort_news_by_published_desc(&mut sorted);

    let mut out = format!("{:<26} {:<20} {:<24} {}", "Published", "Source", "Topic", "Title");
    for item in &sorted {
        let _ = write!(
            out,
            "\n{:<26} {:<20} {:<24} {}\n{:<26} {}",
            truncate(&item.published, 26),
            truncate(&item.source, 20),
            truncate(&item.topic, 24),
            truncate(&item.title, TITLE_WIDTH),
            "",
            item.url
        );
    }
    out
}

pub fn render_pricing(rows: &[PricingHeadline]) -> String {
    if rows.is_empty() {
        return NO_PRICING.to_string();
    }

    let mut out = format!("{:<10} {:<20} {}", "Date", "Source", "Headline");
    for row in rows {
        let _ = write!(
            out,
            "\n{:<10} {:<20} {}",
            row.date,
            truncate(&row.source, 20),
            truncate(&row.headline, TITLE_WIDTH)
        );
    }
    out
}

/// Full dashboard for one refresh.
pub fn render_dashboard(snapshot: &MarketSnapshot, report: &CycleReport, window: (&str, usize)) -> String {
    let mut out = format!("{} Cycle Monitor (data as of {})\n", snapshot.ticker, snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "{}", render_metrics(report));

    section(&mut out, "Alerts");
    let _ = writeln!(out, "{}", render_alerts(report));

    section(&mut out, "Price");
    let _ = writeln!(out, "{}", render_price_window(&snapshot.ticker, &snapshot.price, window.0, window.1));
    let _ = writeln!(out, "{}", render_relative(&snapshot.benchmark, &snapshot.relative));

    section(&mut out, "Cycle Factors");
    let _ = writeln!(out, "{}", render_factors(report));

    section(&mut out, "Theme News");
    let _ = writeln!(out, "{}", render_news(&snapshot.news));

    section(&mut out, "DRAM Pricing Signal Headlines");
    let _ = writeln!(out, "{}", render_pricing(&snapshot.pricing));

    out
}
