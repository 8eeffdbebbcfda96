//! Telegram Bot API notifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::services::error::NotifyError;
use crate::services::notification::{Destination, Notifier};

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts to `{base}/bot{token}/sendMessage`.
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    token: String,
    parse_mode: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(DEFAULT_BASE_URL, token, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            parse_mode: None,
        }
    }

    /// `Markdown`, `MarkdownV2` or `HTML`; plain text when unset.
    pub fn with_parse_mode(mut self, parse_mode: Option<String>) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    fn endpoint(&self) -> Result<Url, NotifyError> {
        Url::parse(&format!("{}/bot{}/sendMessage", self.base_url, self.token)).map_err(|e| {
            NotifyError::Api {
                status: 0,
                message: format!("invalid endpoint: {e}"),
            }
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str, destination: &Destination) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &destination.chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
            disable_web_page_preview: true,
            message_thread_id: destination.thread_id,
        };

        let response = self.client.post(self.endpoint()?).json(&body).send().await?;
        let status = response.status();
        let parsed = response.json::<ApiResponse>().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!(chat_id = %destination.chat_id, "telegram message delivered");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(NotifyError::Api {
                status: status.as_u16(),
                message: description.unwrap_or_else(|| "request rejected".to_string()),
            }),
            None => Err(NotifyError::Api {
                status: status.as_u16(),
                message: "unreadable response body".to_string(),
            }),
        }
    }
}
