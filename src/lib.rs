//! # Stock Drop Alert
//!
//! Tracks the highest observed price of each watched ticker and sends a
//! Telegram alert when a price falls a configured percentage below it.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading and watch list validation
//! - `persistence`: JSON file holding per-ticker high-water marks
//! - `market`: Price providers (Yahoo Finance) and the two-stage price lookup
//! - `notify`: Alert delivery (Telegram)
//! - `tracker`: Per-ticker decisions and the run over the watch list
//! - `error`: Error taxonomy

pub mod config;
pub mod error;
pub mod market;
pub mod notify;
pub mod persistence;
pub mod tracker;

pub use config::Config;
pub use error::{Result, TrackerError};
