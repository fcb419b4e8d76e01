//! Configuration management for the stock drop alert.
//!
//! Loads the watch list from a JSON file, layered with `STOCK_ALERT__*`
//! environment overrides and the Telegram credentials from the environment.

use crate::error::{Result, TrackerError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the Telegram chat id.
pub const TELEGRAM_CHAT_VAR: &str = "TELEGRAM_CHAT_ID";

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Validated tickers and drop threshold
    pub watch: WatchList,
    /// High-water file location
    pub storage: StorageConfig,
    /// Market data provider settings
    pub market: MarketConfig,
    /// Telegram delivery settings
    pub telegram: TelegramConfig,
}

/// Shape of the configuration file before validation.
#[derive(Debug, Clone, Deserialize)]
struct FileConfig {
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default = "default_drop_percent")]
    drop_percent: f64,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    market: MarketConfig,
    #[serde(default)]
    telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted high-water JSON file
    #[serde(default = "default_highs_path")]
    pub highs_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Base URL of the chart API
    #[serde(default = "default_market_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Calendar days of daily closes requested when no fast quote exists
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; normally supplied through `TELEGRAM_BOT_TOKEN`
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Recipient chat id; normally supplied through `TELEGRAM_CHAT_ID`
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Bot API base URL
    #[serde(default = "default_telegram_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_drop_percent() -> f64 {
    20.0
}

fn default_highs_path() -> PathBuf {
    PathBuf::from("data").join("highs.json")
}

fn default_market_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_telegram_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_history_days() -> u32 {
    5
}

/// Ordered, normalized tickers plus the drop percentage that triggers an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchList {
    tickers: Vec<String>,
    drop_percent: f64,
}

impl WatchList {
    /// Normalize tickers (trimmed, uppercase, blanks dropped) and validate
    /// the drop percentage.
    pub fn new<S: AsRef<str>>(tickers: &[S], drop_percent: f64) -> Result<Self> {
        let tickers: Vec<String> = tickers
            .iter()
            .map(|t| t.as_ref().trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tickers.is_empty() {
            return Err(TrackerError::Validation(
                "config must include a non-empty 'tickers' list".to_string(),
            ));
        }

        // NaN fails both comparisons and is rejected here too
        if !(drop_percent > 0.0 && drop_percent < 100.0) {
            return Err(TrackerError::Validation(format!(
                "'drop_percent' must be between 0 and 100 (got {drop_percent})"
            )));
        }

        Ok(Self {
            tickers,
            drop_percent,
        })
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn drop_percent(&self) -> f64 {
        self.drop_percent
    }

    /// Fraction of the high a price may fall to before alerting (e.g. 0.8 for 20%).
    pub fn drop_factor(&self) -> f64 {
        1.0 - self.drop_percent / 100.0
    }

    /// Alert threshold for a given high-water mark.
    pub fn threshold(&self, high: f64) -> f64 {
        high * self.drop_factor()
    }
}

impl Config {
    /// Load configuration from `.env`, the JSON file at `path` and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        config.telegram.apply_credentials(
            std::env::var(TELEGRAM_TOKEN_VAR).ok(),
            std::env::var(TELEGRAM_CHAT_VAR).ok(),
        );
        Ok(config)
    }

    /// Load and validate the JSON file at `path` with `STOCK_ALERT__*` overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(
                config::Environment::with_prefix("STOCK_ALERT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("tickers")
                    .try_parsing(true),
            )
            .build()?;

        let file: FileConfig = settings.try_deserialize()?;
        let watch = WatchList::new(&file.tickers, file.drop_percent)?;

        Ok(Self {
            watch,
            storage: file.storage,
            market: file.market,
            telegram: file.telegram,
        })
    }
}

impl TelegramConfig {
    /// Overlay credentials taken from the environment. Blank values are ignored.
    pub fn apply_credentials(&mut self, bot_token: Option<String>, chat_id: Option<String>) {
        if let Some(token) = non_blank(bot_token) {
            self.bot_token = Some(token);
        }
        if let Some(chat) = non_blank(chat_id) {
            self.chat_id = Some(chat);
        }
    }

    /// Both the token and the chat id are present and non-blank.
    pub fn is_configured(&self) -> bool {
        non_blank(self.bot_token.clone()).is_some() && non_blank(self.chat_id.clone()).is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Keeps the bot token out of log output.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            highs_path: default_highs_path(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base_url(),
            timeout_secs: default_timeout_secs(),
            history_days: default_history_days(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: default_telegram_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
