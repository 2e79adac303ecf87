use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use portfolio_dashboard::config::DashboardConfig;
use portfolio_dashboard::horizon::Selection;
use portfolio_dashboard::pipeline::Dashboard;
use portfolio_dashboard::providers::build_provider;
use serde::Serialize;

#[derive(Parser)]
#[command(version, about = "Index trends and peer comparisons from daily bars")]
struct Cli {
    /// TOML settings; defaults apply when the file does not exist.
    #[arg(long, value_name = "FILE", default_value = "dashboard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Candles and moving averages for the configured indices.
    Index(IndexCmd),
    /// Normalized performance of a basket of tickers.
    Peers(PeersCmd),
}

#[derive(Args)]
struct IndexCmd {
    /// Trailing months to show (1-12).
    #[arg(long)]
    months: Option<u32>,
    /// Last day of the window, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    anchor: Option<NaiveDate>,
    /// Only this index symbol.
    #[arg(long)]
    ticker: Option<String>,
}

#[derive(Args)]
struct PeersCmd {
    /// Comma-separated tickers.
    #[arg(long)]
    tickers: Option<String>,
    /// One of 1mo, 3mo, 6mo, 1y, 5y, 10y, 20y.
    #[arg(long)]
    horizon: Option<String>,
    #[arg(long)]
    anchor: Option<NaiveDate>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let provider = build_provider(&config.provider).context("building data provider")?;
    let today = Utc::now().with_timezone(&config.timezone).date_naive();
    let dashboard = Dashboard::new(provider, config);

    match cli.cmd {
        Cmd::Index(IndexCmd {
            months,
            anchor,
            ticker,
        }) => {
            let report = dashboard
                .index_views(months, anchor.unwrap_or(today), ticker.as_deref())
                .await?;
            print_json(&report)?;
        }
        Cmd::Peers(PeersCmd {
            tickers,
            horizon,
            anchor,
        }) => {
            let peers = &dashboard.config().peers;
            let tickers = tickers.unwrap_or_else(|| peers.default_tickers.clone());
            let horizon = horizon.unwrap_or_else(|| peers.default_horizon.to_string());
            let selection = Selection::parse(&tickers, &horizon)?;
            let report = dashboard
                .peers(&selection, anchor.unwrap_or(today))
                .await?;
            print_json(&report)?;
        }
    }

    Ok(())
}
