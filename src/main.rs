//! Stock Drop Alert - Main Entry Point
//!
//! One invocation is one run over the watch list; schedule it externally
//! (cron, systemd timer, CI schedule).

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stock_drop_alert::config::Config;
use stock_drop_alert::market::YahooClient;
use stock_drop_alert::notify::{Notifier, TelegramNotifier};
use stock_drop_alert::persistence::HighWaterStore;
use stock_drop_alert::tracker::{RunSummary, Tracker};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,stock_drop_alert=debug";

/// Exit code for `--strict` runs where no ticker could be priced.
const EXIT_ALL_FAILED: u8 = 2;

/// Stock Drop Alert CLI
#[derive(Parser)]
#[command(name = "stock-drop-alert")]
#[command(version, about = "Alert when stocks fall a set percentage below their recorded high")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Override the high-water file location
    #[arg(long, global = true)]
    highs: Option<PathBuf>,

    /// Also write daily-rolling log files to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Fetch and evaluate, but do not send alerts or save highs
    #[arg(long)]
    dry_run: bool,

    /// Exit non-zero when every ticker failed to fetch
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stored highs and current alert thresholds (no network calls)
    Status,

    /// Send a test message through the configured notifier
    TestNotify {
        /// Message text (defaults to a timestamped test message)
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.log_dir.as_deref())?;

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    if let Some(highs) = cli.highs {
        config.storage.highs_path = highs;
    }

    match cli.command {
        Some(Commands::Status) => {
            show_status(&config)?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::TestNotify { message }) => {
            test_notify(&config, message).await?;
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    log_config(&config, cli.dry_run);

    let summary = run(&config, cli.dry_run).await?;
    if cli.strict && summary.all_failed() {
        error!("No ticker could be priced ({} checked)", summary.checked);
        return Ok(ExitCode::from(EXIT_ALL_FAILED));
    }

    Ok(ExitCode::SUCCESS)
}

/// One monitoring run with the live providers.
async fn run(config: &Config, dry_run: bool) -> Result<RunSummary> {
    let quotes = YahooClient::new(&config.market)?;
    let notifier = TelegramNotifier::new(&config.telegram)?;
    let store = HighWaterStore::new(&config.storage.highs_path);

    let summary = Tracker::new(
        &config.watch,
        &store,
        &quotes,
        config.market.history_days,
        &notifier,
    )
    .dry_run(dry_run)
    .run()
    .await?;

    Ok(summary)
}

/// Initialize logging to stdout, plus rolling files when `log_dir` is set.
fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            let file_appender = tracing_appender::rolling::daily(dir, "stock-drop-alert.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

            builder
                .with_writer(std::io::stdout.and(file_writer))
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            builder.init();
            Ok(None)
        }
    }
}

/// Log configuration on startup.
fn log_config(config: &Config, dry_run: bool) {
    info!("Configuration:");
    info!("   Tickers: {}", config.watch.tickers().join(", "));
    info!("   Drop Threshold: {:.2}%", config.watch.drop_percent());
    info!("   Highs File: {:?}", config.storage.highs_path);
    info!(
        "   Telegram: {}",
        if config.telegram.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
    if dry_run {
        info!("   Dry Run: alerts and saves disabled");
    }
}

/// Print stored highs and the price at which each configured ticker alerts.
fn show_status(config: &Config) -> Result<()> {
    let store = HighWaterStore::new(&config.storage.highs_path);
    let highs = store.load()?;

    println!("High-water file: {}", store.path().display());
    println!("Drop threshold:  {:.2}%", config.watch.drop_percent());

    println!("\nWatched tickers");
    for ticker in config.watch.tickers() {
        match highs.get(ticker) {
            Some(&high) => println!(
                "   {:<8} high {:>12.2}   alert at <= {:>12.2}",
                ticker,
                high,
                config.watch.threshold(high)
            ),
            None => println!("   {:<8} no high recorded yet", ticker),
        }
    }

    let unwatched: Vec<_> = highs
        .keys()
        .filter(|t| !config.watch.tickers().contains(*t))
        .collect();
    if !unwatched.is_empty() {
        println!("\nStored but not watched");
        for ticker in unwatched {
            println!("   {:<8} high {:>12.2}", ticker, highs[ticker]);
        }
    }

    Ok(())
}

/// Send a test message and fail if it was not delivered.
async fn test_notify(config: &Config, message: Option<String>) -> Result<()> {
    let notifier = TelegramNotifier::new(&config.telegram)?;
    let text = message.unwrap_or_else(|| {
        format!(
            "stock-drop-alert test message\nTime (UTC): {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
        )
    });

    let delivery = notifier.notify(&text).await;
    info!("Test message {}", delivery);
    anyhow::ensure!(delivery.is_sent(), "test message {}", delivery);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_filter_enables_crate_debug() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(DEFAULT_LOG_FILTER.contains("stock_drop_alert=debug"));
    }
}
