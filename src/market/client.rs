//! Yahoo Finance chart API client.
//!
//! Uses the public `/v8/finance/chart/{symbol}` endpoint for both the
//! last traded price (`meta.regularMarketPrice`) and daily closes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::traits::QuoteProvider;
use super::types::*;
use crate::config::MarketConfig;

/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance client for quotes and daily closes.
#[derive(Debug, Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a client from configuration.
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the chart for `ticker` with the given query parameters.
    #[instrument(skip(self, query), name = "yahoo_chart")]
    async fn chart(&self, ticker: &str, query: &[(&str, String)]) -> Result<ChartResult> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(ticker)
        );

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .context("Failed to send chart request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart API error {}: {}", status, body);
        }

        let data: ChartResponse = response
            .json()
            .await
            .context("Failed to parse chart response")?;

        if let Some(err) = data.chart.error {
            anyhow::bail!("Yahoo chart error {}: {}", err.code, err.description);
        }

        data.chart
            .result
            .and_then(|results| results.into_iter().next())
            .with_context(|| format!("Empty chart result for {}", ticker))
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fast_quote(&self, ticker: &str) -> Result<Option<f64>> {
        let chart = self
            .chart(
                ticker,
                &[("range", "1d".to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        debug!(
            "{} regularMarketPrice={:?} {}",
            chart.meta.symbol,
            chart.meta.regular_market_price,
            chart.meta.currency.as_deref().unwrap_or("")
        );
        Ok(chart.meta.regular_market_price)
    }

    async fn daily_closes(&self, ticker: &str, days: u32) -> Result<Vec<f64>> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(i64::from(days));

        let chart = self
            .chart(
                ticker,
                &[
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;

        let closes = chart.closes();
        debug!("Fetched {} daily closes for {}", closes.len(), ticker);
        Ok(closes)
    }
}
