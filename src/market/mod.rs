//! Market data for ticker prices.
//!
//! ## Yahoo Finance
//! The chart endpoint serves both lookups the tracker needs:
//! - Last traded price (`meta.regularMarketPrice`)
//! - Daily closes over a trailing window
//!
//! [`PriceFetcher`] combines them into one price per ticker.

mod client;
mod fetcher;
pub mod mock;
mod traits;
mod types;

pub use client::YahooClient;
pub use fetcher::{PriceFetcher, QuoteLookup};
pub use mock::MockQuoteProvider;
pub use traits::QuoteProvider;
pub use types::*;
