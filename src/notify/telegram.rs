//! Telegram Bot API notifier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use super::{Delivery, Notifier};
use crate::config::TelegramConfig;

/// Sends messages through `POST /bot<token>/sendMessage`.
pub struct TelegramNotifier {
    http: Client,
    api_base_url: String,
    credentials: Option<Credentials>,
}

struct Credentials {
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier. Missing credentials are allowed and make every
    /// send a no-op reporting [`Delivery::NotConfigured`].
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let credentials = if config.is_configured() {
            Some(Credentials {
                bot_token: config.bot_token.clone().unwrap_or_default().trim().to_string(),
                chat_id: config.chat_id.clone().unwrap_or_default().trim().to_string(),
            })
        } else {
            None
        };

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    #[instrument(skip_all, name = "telegram_send")]
    async fn send(&self, credentials: &Credentials, text: &str) -> Delivery {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base_url, credentials.bot_token
        );

        let response = match self
            .http
            .post(&url)
            .form(&[("chat_id", credentials.chat_id.as_str()), ("text", text)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors carry the URL, which contains the token
                let reason = e.without_url().to_string();
                error!("Telegram request failed: {}", reason);
                return Delivery::Failed(reason);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Telegram error {}: {}", status.as_u16(), body);
            return Delivery::Rejected {
                status: status.as_u16(),
                body,
            };
        }

        debug!("Telegram message delivered to chat {}", credentials.chat_id);
        Delivery::Sent
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Delivery {
        match &self.credentials {
            Some(credentials) => self.send(credentials, text).await,
            None => {
                warn!("Telegram not configured; set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID.");
                Delivery::NotConfigured
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, token: Option<&str>, chat: Option<&str>) -> TelegramConfig {
        let mut config = TelegramConfig {
            api_base_url: server.uri(),
            timeout_secs: 5,
            ..TelegramConfig::default()
        };
        config.apply_credentials(token.map(String::from), chat.map(String::from));
        config
    }

    #[tokio::test]
    async fn test_sends_form_to_send_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_string_contains("chat_id=42"))
            .and(body_string_contains("text=AAPL+dropped"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(&config_for(&server, Some("123:abc"), Some("42"))).unwrap();
        assert_eq!(notifier.notify("AAPL dropped").await, Delivery::Sent);
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(&config_for(&server, Some("t"), Some("1"))).unwrap();
        let delivery = notifier.notify("hello").await;

        assert_eq!(
            delivery,
            Delivery::Rejected {
                status: 400,
                body: "chat not found".to_string()
            }
        );
        assert!(!delivery.is_sent());
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for (token, chat) in [(None, Some("42")), (Some("t"), None), (Some(""), Some(" "))] {
            let notifier = TelegramNotifier::new(&config_for(&server, token, chat)).unwrap();
            assert!(!notifier.is_configured());
            assert_eq!(notifier.notify("hello").await, Delivery::NotConfigured);
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_failed() {
        let config = TelegramConfig {
            bot_token: Some("t".to_string()),
            chat_id: Some("1".to_string()),
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        };

        let notifier = TelegramNotifier::new(&config).unwrap();
        assert!(matches!(notifier.notify("hello").await, Delivery::Failed(_)));
    }
}
