//! Per-ticker decision logic.

use chrono::{DateTime, SecondsFormat, Utc};

/// What a single price observation means for a ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// No high recorded yet; the price becomes the high.
    InitialHigh,
    /// Price exceeds the recorded high.
    NewHigh { previous: f64 },
    /// Price is at or below the threshold.
    Alert { high: f64, threshold: f64 },
    /// Price is between the threshold and the high.
    Steady { high: f64, threshold: f64 },
}

impl Decision {
    /// The high-water table must be updated with the observed price.
    pub fn raises_high(&self) -> bool {
        matches!(self, Decision::InitialHigh | Decision::NewHigh { .. })
    }
}

/// Classify `price` against the recorded `high`.
///
/// `drop_factor` is `1 - drop_percent / 100`. A new high never reaches the
/// threshold comparison, and a price exactly on the threshold alerts.
pub fn evaluate(high: Option<f64>, price: f64, drop_factor: f64) -> Decision {
    let Some(high) = high else {
        return Decision::InitialHigh;
    };

    if price > high {
        return Decision::NewHigh { previous: high };
    }

    let threshold = high * drop_factor;
    if price <= threshold {
        Decision::Alert { high, threshold }
    } else {
        Decision::Steady { high, threshold }
    }
}

/// Alert text sent to the notifier.
pub fn format_alert(
    ticker: &str,
    drop_percent: f64,
    price: f64,
    high: f64,
    at: DateTime<Utc>,
) -> String {
    format!(
        "{} is {:.0}% or more below its high.\nPrice: {:.2}\nHigh: {:.2}\nTime (UTC): {}",
        ticker,
        drop_percent,
        price,
        high,
        at.to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}
