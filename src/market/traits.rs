//! Provider-agnostic interface for price data.

use async_trait::async_trait;

/// Source of prices for ticker symbols.
///
/// Implementations only report what the provider returned; choosing between
/// the fast quote and the historical close is done by
/// [`PriceFetcher`](super::PriceFetcher).
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short provider name for log lines.
    fn name(&self) -> &'static str;

    /// Near-real-time last traded price, if the provider has one.
    async fn fast_quote(&self, ticker: &str) -> anyhow::Result<Option<f64>>;

    /// Daily closes covering the trailing `days` calendar days, oldest first.
    async fn daily_closes(&self, ticker: &str, days: u32) -> anyhow::Result<Vec<f64>>;
}
