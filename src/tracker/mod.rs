//! High-water tracking run.
//!
//! One run walks the watch list in order, updates the high-water table and
//! sends an alert for every ticker trading at or below its drop threshold.
//!
//! - `decision`: pure per-ticker evaluation and alert text
//! - `runner`: the sequential loop over tickers and persistence

mod decision;
mod runner;

pub use decision::{evaluate, format_alert, Decision};
pub use runner::{RunSummary, Tracker};
