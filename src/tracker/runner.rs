//! Sequential run over the watch list.

use chrono::Utc;
use std::fmt;
use tracing::{info, warn};

use super::decision::{evaluate, format_alert, Decision};
use crate::config::WatchList;
use crate::error::Result;
use crate::market::{PriceFetcher, QuoteProvider};
use crate::notify::Notifier;
use crate::persistence::{HighWaterStore, HighWaterTable};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub fetch_failures: usize,
    pub initial_highs: usize,
    pub new_highs: usize,
    pub alerts: usize,
    pub alerts_delivered: usize,
    pub saved: bool,
}

impl RunSummary {
    /// At least one high was set or raised.
    pub fn highs_changed(&self) -> bool {
        self.initial_highs + self.new_highs > 0
    }

    /// Every checked ticker failed to produce a price.
    pub fn all_failed(&self) -> bool {
        self.checked > 0 && self.fetch_failures == self.checked
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checked, {} failed, {} initial, {} new highs, {}/{} alerts delivered",
            self.checked,
            self.fetch_failures,
            self.initial_highs,
            self.new_highs,
            self.alerts_delivered,
            self.alerts
        )
    }
}

/// Runs the check over every ticker of a [`WatchList`].
pub struct Tracker<'a> {
    watch: &'a WatchList,
    store: &'a HighWaterStore,
    fetcher: PriceFetcher<'a>,
    notifier: &'a dyn Notifier,
    dry_run: bool,
}

impl<'a> Tracker<'a> {
    pub fn new(
        watch: &'a WatchList,
        store: &'a HighWaterStore,
        provider: &'a dyn QuoteProvider,
        history_days: u32,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            watch,
            store,
            fetcher: PriceFetcher::new(provider, history_days),
            notifier,
            dry_run: false,
        }
    }

    /// Evaluate without sending alerts or saving highs.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Load highs, check every ticker, and save highs if any changed.
    ///
    /// Only storage errors are returned; price and delivery failures are
    /// logged and counted.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut highs = self.store.load()?;
        let mut summary = self.check_all(&mut highs).await;

        if !summary.highs_changed() {
            info!("No high updates.");
        } else if self.dry_run {
            info!("Dry run: not saving highs to {:?}", self.store.path());
        } else {
            self.store.save(&highs)?;
            summary.saved = true;
        }

        info!("Run complete: {}", summary);
        Ok(summary)
    }

    /// Check every ticker in configuration order against `highs`.
    pub async fn check_all(&self, highs: &mut HighWaterTable) -> RunSummary {
        let mut summary = RunSummary::default();
        for ticker in self.watch.tickers() {
            summary.checked += 1;
            self.check_ticker(ticker, highs, &mut summary).await;
        }
        summary
    }

    async fn check_ticker(
        &self,
        ticker: &str,
        highs: &mut HighWaterTable,
        summary: &mut RunSummary,
    ) {
        let price = match self.fetcher.fetch(ticker).await {
            Ok(price) => price,
            Err(e) => {
                warn!("{}: failed to fetch price: {}", ticker, e);
                summary.fetch_failures += 1;
                return;
            }
        };

        let decision = evaluate(highs.get(ticker).copied(), price, self.watch.drop_factor());
        if decision.raises_high() {
            highs.insert(ticker.to_string(), price);
        }

        match decision {
            Decision::InitialHigh => {
                summary.initial_highs += 1;
                info!("{}: initial high set to {:.2}", ticker, price);
            }
            Decision::NewHigh { previous } => {
                summary.new_highs += 1;
                info!("{}: new high {:.2} (prev {:.2})", ticker, price, previous);
            }
            Decision::Alert { high, threshold } => {
                summary.alerts += 1;
                let message =
                    format_alert(ticker, self.watch.drop_percent(), price, high, Utc::now());

                if self.dry_run {
                    info!(
                        "{}: alert not sent, dry run (price {:.2}, high {:.2}, threshold {:.2})",
                        ticker, price, high, threshold
                    );
                    return;
                }

                let delivery = self.notifier.notify(&message).await;
                if delivery.is_sent() {
                    summary.alerts_delivered += 1;
                }
                info!(
                    "{}: alert {} (price {:.2}, high {:.2})",
                    ticker, delivery, price, high
                );
            }
            Decision::Steady { high, .. } => {
                info!("{}: price {:.2}, high {:.2}", ticker, price, high);
            }
        }
    }
}
