//! Two-stage price lookup: fast quote first, recent daily close second.

use tracing::debug;

use super::traits::QuoteProvider;
use crate::error::{Result, TrackerError};

/// Outcome of a single lookup stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteLookup {
    Value(f64),
    Unavailable,
}

impl QuoteLookup {
    /// Only finite, positive prices are usable.
    fn from_price(price: Option<f64>) -> Self {
        match price {
            Some(p) if p.is_finite() && p > 0.0 => QuoteLookup::Value(p),
            _ => QuoteLookup::Unavailable,
        }
    }
}

/// Resolves the current price of a ticker through a [`QuoteProvider`].
pub struct PriceFetcher<'a> {
    provider: &'a dyn QuoteProvider,
    history_days: u32,
}

impl<'a> PriceFetcher<'a> {
    pub fn new(provider: &'a dyn QuoteProvider, history_days: u32) -> Self {
        Self {
            provider,
            history_days,
        }
    }

    /// Current price of `ticker`, or [`TrackerError::DataUnavailable`].
    pub async fn fetch(&self, ticker: &str) -> Result<f64> {
        if let QuoteLookup::Value(price) = self.fast_lookup(ticker).await {
            return Ok(price);
        }

        match self.history_lookup(ticker).await? {
            QuoteLookup::Value(price) => Ok(price),
            QuoteLookup::Unavailable => Err(TrackerError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!("no price data in the last {} days", self.history_days),
            }),
        }
    }

    /// Stage 1. Provider errors degrade to `Unavailable`.
    pub async fn fast_lookup(&self, ticker: &str) -> QuoteLookup {
        match self.provider.fast_quote(ticker).await {
            Ok(price) => QuoteLookup::from_price(price),
            Err(e) => {
                debug!(
                    "{}: fast quote from {} unavailable: {:#}",
                    ticker,
                    self.provider.name(),
                    e
                );
                QuoteLookup::Unavailable
            }
        }
    }

    /// Stage 2: most recent usable daily close in the trailing window.
    pub async fn history_lookup(&self, ticker: &str) -> Result<QuoteLookup> {
        let closes = self
            .provider
            .daily_closes(ticker, self.history_days)
            .await
            .map_err(|e| TrackerError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!("{:#}", e),
            })?;

        let latest = closes
            .into_iter()
            .rev()
            .find(|p| p.is_finite() && *p > 0.0);
        Ok(QuoteLookup::from_price(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockQuoteProvider;

    #[tokio::test]
    async fn test_fast_quote_wins() {
        let provider = MockQuoteProvider::new()
            .with_fast_quote("AAPL", 190.0)
            .with_closes("AAPL", &[180.0]);
        let fetcher = PriceFetcher::new(&provider, 5);

        assert_eq!(fetcher.fetch("AAPL").await.unwrap(), 190.0);
        assert_eq!(provider.history_requests(), 0);
    }

    #[tokio::test]
    async fn test_zero_fast_quote_falls_back_to_latest_close() {
        let provider = MockQuoteProvider::new()
            .with_fast_quote("AAPL", 0.0)
            .with_closes("AAPL", &[170.0, 175.0, 180.0]);
        let fetcher = PriceFetcher::new(&provider, 5);

        assert_eq!(fetcher.fetch("AAPL").await.unwrap(), 180.0);
        assert_eq!(provider.history_requests(), 1);
    }

    #[tokio::test]
    async fn test_fast_quote_error_is_swallowed() {
        let provider = MockQuoteProvider::new()
            .failing_fast_quote("MSFT")
            .with_closes("MSFT", &[400.0, 410.0]);
        let fetcher = PriceFetcher::new(&provider, 5);

        assert_eq!(
            fetcher.fast_lookup("MSFT").await,
            QuoteLookup::Unavailable
        );
        assert_eq!(fetcher.fetch("MSFT").await.unwrap(), 410.0);
    }

    #[tokio::test]
    async fn test_trailing_unusable_closes_are_skipped() {
        let provider = MockQuoteProvider::new().with_closes("AMD", &[150.0, f64::NAN, 0.0]);
        let fetcher = PriceFetcher::new(&provider, 5);

        assert_eq!(fetcher.fetch("AMD").await.unwrap(), 150.0);
    }

    #[tokio::test]
    async fn test_empty_history_is_data_unavailable() {
        let provider = MockQuoteProvider::new();
        let fetcher = PriceFetcher::new(&provider, 5);

        assert!(matches!(
            fetcher.fetch("GONE").await,
            Err(TrackerError::DataUnavailable { ticker, .. }) if ticker == "GONE"
        ));
    }

    #[tokio::test]
    async fn test_history_failure_is_data_unavailable() {
        let provider = MockQuoteProvider::new()
            .failing_fast_quote("X")
            .failing_history("X");
        let fetcher = PriceFetcher::new(&provider, 5);

        assert!(matches!(
            fetcher.fetch("X").await,
            Err(TrackerError::DataUnavailable { .. })
        ));
    }
}
