//! In-memory quote provider for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::traits::QuoteProvider;

/// Quote provider backed by fixed per-ticker data.
///
/// Tickers without a fast quote answer `Ok(None)`; tickers without closes
/// answer an empty window.
#[derive(Debug, Default)]
pub struct MockQuoteProvider {
    fast_quotes: HashMap<String, f64>,
    closes: HashMap<String, Vec<f64>>,
    failing_fast: HashSet<String>,
    failing_history: HashSet<String>,
    fast_requests: AtomicUsize,
    history_requests: AtomicUsize,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fast quote returned for `ticker`.
    pub fn with_fast_quote(mut self, ticker: &str, price: f64) -> Self {
        self.fast_quotes.insert(ticker.to_string(), price);
        self
    }

    /// Set the daily closes (oldest first) returned for `ticker`.
    pub fn with_closes(mut self, ticker: &str, closes: &[f64]) -> Self {
        self.closes.insert(ticker.to_string(), closes.to_vec());
        self
    }

    /// Make the fast quote for `ticker` fail with a provider error.
    pub fn failing_fast_quote(mut self, ticker: &str) -> Self {
        self.failing_fast.insert(ticker.to_string());
        self
    }

    /// Make the history request for `ticker` fail with a provider error.
    pub fn failing_history(mut self, ticker: &str) -> Self {
        self.failing_history.insert(ticker.to_string());
        self
    }

    pub fn fast_requests(&self) -> usize {
        self.fast_requests.load(Ordering::SeqCst)
    }

    pub fn history_requests(&self) -> usize {
        self.history_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fast_quote(&self, ticker: &str) -> Result<Option<f64>> {
        self.fast_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_fast.contains(ticker) {
            anyhow::bail!("simulated fast quote failure for {}", ticker);
        }
        Ok(self.fast_quotes.get(ticker).copied())
    }

    async fn daily_closes(&self, ticker: &str, _days: u32) -> Result<Vec<f64>> {
        self.history_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing_history.contains(ticker) {
            anyhow::bail!("simulated history failure for {}", ticker);
        }
        Ok(self.closes.get(ticker).cloned().unwrap_or_default())
    }
}
