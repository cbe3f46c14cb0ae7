//! cycle-monitor: semiconductor memory cycle dashboard for the terminal.
//!
//! Fetches prices, quarterly fundamentals and themed news, scores the cycle
//! and prints a text dashboard (or the report as JSON).
//!
//! Usage:
//!   cargo run -p cycle-monitor
//!   cargo run -p cycle-monitor -- --ticker MU --benchmark SOXX --window 5M
//!   cargo run -p cycle-monitor -- --json
//!   cargo run -p cycle-monitor -- --watch 300

mod render;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use cycle_engine::{CycleConfig, CycleEngine, CycleReport, MarketSnapshot};
use serde::Serialize;
use std::time::Duration;

/// Command-line overrides on top of the environment configuration
struct CliArgs {
    ticker: Option<String>,
    benchmark: Option<String>,
    lookback: Option<i64>,
    window: (&'static str, usize),
    json: bool,
    watch: Option<u64>,
}

/// Value following `flag`. A flag followed by nothing or by another flag is an error.
fn flag_value<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    let Some(idx) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(idx + 1) {
        Some(value) if !value.starts_with("--") => Ok(Some(value.as_str())),
        _ => bail!("{} requires a value", flag),
    }
}

enum Command {
    Run(CliArgs),
    Help,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Command::Help);
    }

    let window_label = flag_value(args, "--window")?.unwrap_or(render::DEFAULT_WINDOW);
    let window = match render::resolve_window(window_label) {
        Some(window) => window,
        None => bail!(
            "unknown --window '{}' (expected one of: {})",
            window_label,
            render::PRICE_WINDOWS
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    Ok(Command::Run(CliArgs {
        ticker: flag_value(args, "--ticker")?.map(|s| s.to_uppercase()),
        benchmark: flag_value(args, "--benchmark")?.map(|s| s.to_uppercase()),
        lookback: flag_value(args, "--lookback")?
            .map(|v| v.parse().context("--lookback must be an integer"))
            .transpose()?,
        window,
        json: args.iter().any(|a| a == "--json"),
        watch: flag_value(args, "--watch")?
            .map(|v| v.parse().context("--watch must be a number of seconds"))
            .transpose()?,
    }))
}

fn print_usage() {
    println!("Usage:");
    println!("  cycle-monitor [options]");
    println!();
    println!("Options:");
    println!("  --ticker SYMBOL      Stock to monitor (default: MU_TICKER or MU)");
    println!("  --benchmark SYMBOL   Relative strength benchmark (default: BENCHMARK_TICKER or SOXX)");
    println!("  --lookback DAYS      Calendar days of price history (default: LOOKBACK_DAYS or 420)");
    println!("  --window LABEL       Price window: 1D, 5D, 1M, 5M, 1Y (default: 1M)");
    println!("  --json               Print the report as JSON instead of the dashboard");
    println!("  --watch SECS         Refresh every SECS seconds until interrupted");
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    benchmark: &'a str,
    fetched_at: DateTime<Utc>,
    report: &'a CycleReport,
    news_items: usize,
    pricing_headlines: usize,
}

fn print_once(snapshot: &MarketSnapshot, report: &CycleReport, cli: &CliArgs) -> anyhow::Result<()> {
    if cli.json {
        let output = JsonOutput {
            benchmark: &snapshot.benchmark,
            fetched_at: snapshot.fetched_at,
            report,
            news_items: snapshot.news.len(),
            pricing_headlines: snapshot.pricing.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::render_dashboard(snapshot, report, cli.window));
    }
    Ok(())
}

/// Environment configuration with command-line overrides applied.
fn build_config(cli: &CliArgs) -> anyhow::Result<CycleConfig> {
    let mut config = CycleConfig::from_env().context("invalid configuration")?;
    if let Some(ticker) = &cli.ticker {
        config.ticker = ticker.clone();
    }
    if let Some(benchmark) = &cli.benchmark {
        config.benchmark_ticker = benchmark.clone();
    }
    if let Some(lookback) = cli.lookback {
        config.lookback_days = lookback;
    }
    config.validate().context("invalid command-line overrides")?;
    Ok(config)
}

async fn run(config: CycleConfig, cli: CliArgs) -> anyhow::Result<()> {
    let engine = CycleEngine::from_config(config)?;

    match cli.watch {
        None => {
            let (snapshot, report) = engine.refresh().await?;
            print_once(&snapshot, &report, &cli)
        }
        Some(secs) => {
            let interval = Duration::from_secs(secs.max(1));
            tracing::info!("Watch mode: refreshing every {}s", interval.as_secs());
            loop {
                match engine.refresh().await {
                    Ok((snapshot, report)) => print_once(&snapshot, &report, &cli)?,
                    Err(e) => tracing::error!("Refresh failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Where a run failed, which decides the message and exit code.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Args,
    Config,
    Load,
}

fn failure(stage: Stage, err: &anyhow::Error) -> (String, i32) {
    match stage {
        Stage::Args => (format!("error: {:#}\nRun with --help for usage.", err), 2),
        Stage::Config => (format!("error: {:#}", err), 2),
        Stage::Load => (format!("Failed to load market/fundamental/news data: {:#}", err), 1),
    }
}

fn exit_with(stage: Stage, err: anyhow::Error) -> ! {
    let (message, code) = failure(stage, &err);
    eprintln!("{}", message);
    std::process::exit(code)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cycle_monitor=info,cycle_engine=info".into());
    if std::env::var("RUST_LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Err(e) => exit_with(Stage::Args, e),
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(Stage::Config, e),
    };

    if let Err(e) = run(config, cli).await {
        exit_with(Stage::Load, e);
    }
}
