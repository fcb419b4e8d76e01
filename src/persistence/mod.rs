//! JSON persistence for per-ticker high-water marks.
//!
//! The file is a flat object of `{ "TICKER": high }`, written with sorted
//! keys and 2-space indentation so that it diffs cleanly under version
//! control.

use crate::error::{Result, TrackerError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Highest observed price per ticker, ordered by ticker.
pub type HighWaterTable = BTreeMap<String, f64>;

/// File-backed high-water store.
#[derive(Debug, Clone)]
pub struct HighWaterStore {
    path: PathBuf,
}

impl HighWaterStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table. A missing file yields an empty table.
    ///
    /// Entries whose value is not a positive number (or a string holding
    /// one) are skipped with a warning; a file that is not a JSON object
    /// is a [`TrackerError::Format`]. Keys are uppercased, and when two keys
    /// collide the later one in the file wins.
    pub fn load(&self) -> Result<HighWaterTable> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No high-water file at {:?}, starting empty", self.path);
                return Ok(HighWaterTable::new());
            }
            Err(e) => return Err(e.into()),
        };

        let raw: Value = serde_json::from_str(&contents).map_err(|e| self.format_error(e))?;
        let Value::Object(entries) = raw else {
            return Err(self.format_error("expected a JSON object of {ticker: high}"));
        };

        let mut highs = HighWaterTable::new();
        for (key, value) in entries {
            let Some(high) = parse_high(&value) else {
                warn!("Ignoring bad high for {:?}: {}", key, value);
                continue;
            };

            let ticker = key.trim().to_uppercase();
            if let Some(previous) = highs.insert(ticker.clone(), high) {
                warn!(
                    "Duplicate high for {} ({:?}): keeping {} over {}",
                    ticker, key, high, previous
                );
            }
        }

        debug!("Loaded {} highs from {:?}", highs.len(), self.path);
        Ok(highs)
    }

    /// Replace the file with `highs`, creating parent directories as needed.
    ///
    /// The table is written to a sibling temp file first and renamed into
    /// place.
    pub fn save(&self, highs: &HighWaterTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, render(highs)?)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            std::fs::remove_file(&tmp_path).ok();
            return Err(e.into());
        }

        info!("Saved {} highs to {:?}", highs.len(), self.path);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "highs.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn format_error(&self, reason: impl ToString) -> TrackerError {
        TrackerError::Format {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Serialize the table: sorted keys, 2-space indent, trailing newline.
pub fn render(highs: &HighWaterTable) -> Result<String> {
    let mut out = serde_json::to_string_pretty(highs)?;
    out.push('\n');
    Ok(out)
}

fn parse_high(value: &Value) -> Option<f64> {
    let high = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (high.is_finite() && high > 0.0).then_some(high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    /// Fresh, empty scratch directory for one test.
    fn scratch_dir() -> PathBuf {
        let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "stock-drop-alert-store-{}-{}",
            std::process::id(),
            n
        ));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn table(entries: &[(&str, f64)]) -> HighWaterTable {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn write_highs(dir: &Path, contents: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("highs.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = scratch_dir();
        let store = HighWaterStore::new(dir.join("highs.json"));
        assert!(store.load().unwrap().is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let dir = scratch_dir();
        let path = write_highs(
            &dir,
            r#"{"AAA": 10, "BBB": "x", "ccc": "12.5", "DDD": null, "EEE": -3, "FFF": [1]}"#,
        );

        let highs = HighWaterStore::new(&path).load().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(highs, table(&[("AAA", 10.0), ("CCC", 12.5)]));
    }

    #[test]
    fn test_case_colliding_keys_keep_last_in_file() {
        let dir = scratch_dir();

        let path = write_highs(&dir, r#"{"aapl": 5, "AAPL": 10}"#);
        let lower_first = HighWaterStore::new(&path).load().unwrap();

        let path = write_highs(&dir, r#"{"AAPL": 10, " aapl ": 5}"#);
        let upper_first = HighWaterStore::new(&path).load().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(lower_first, table(&[("AAPL", 10.0)]));
        assert_eq!(upper_first, table(&[("AAPL", 5.0)]));
    }

    #[test]
    fn test_non_object_is_format_error() {
        let dir = scratch_dir();

        for contents in ["[1, 2, 3]", "42", "not json"] {
            let path = write_highs(&dir, contents);
            assert!(
                matches!(
                    HighWaterStore::new(&path).load(),
                    Err(TrackerError::Format { .. })
                ),
                "{contents} should be rejected"
            );
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_creates_parent_and_sorts_keys() {
        let dir = scratch_dir();
        let path = dir.join("nested").join("highs.json");
        let store = HighWaterStore::new(&path);

        let mut highs = HighWaterTable::new();
        highs.insert("MSFT".to_string(), 420.5);
        highs.insert("AAPL".to_string(), 190.0);
        store.save(&highs).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let tmp_left = store.tmp_path().exists();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(written, "{\n  \"AAPL\": 190.0,\n  \"MSFT\": 420.5\n}\n");
        assert!(!tmp_left);
    }

    #[test]
    fn test_save_is_deterministic() {
        let dir = scratch_dir();
        let path = dir.join("highs.json");
        let store = HighWaterStore::new(&path);
        let highs = table(&[("ZM", 70.25), ("AMD", 150.0), ("NVDA", 900.125)]);

        store.save(&highs).unwrap();
        let first = std::fs::read(&path).unwrap();
        store.save(&highs).unwrap();
        let second = std::fs::read(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = scratch_dir();
        let store = HighWaterStore::new(dir.join("highs.json"));

        store
            .save(&table(&[("AAPL", 1.0), ("MSFT", 2.0), ("GOOG", 3.0)]))
            .unwrap();
        store.save(&table(&[("AAPL", 5.0)])).unwrap();
        let loaded = store.load().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, table(&[("AAPL", 5.0)]));
    }

    #[test]
    fn test_round_trip() {
        let dir = scratch_dir();
        let store = HighWaterStore::new(dir.join("highs.json"));
        let highs = table(&[
            ("AAPL", 198.11),
            ("BRK-B", 0.1 + 0.2),
            ("TSLA", 1e-7),
            ("^GSPC", 5_123.456_789),
        ]);

        store.save(&highs).unwrap();
        let loaded = store.load().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, highs);
    }
}
