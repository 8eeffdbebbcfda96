//! Notification channel interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::error::NotifyError;

/// Where a report goes: a chat and, optionally, a thread inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<i64>,
}

impl Destination {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            thread_id: None,
        }
    }

    pub fn with_thread(mut self, thread_id: Option<i64>) -> Self {
        self.thread_id = thread_id;
        self
    }
}

/// Delivers text to a destination. Retrying a send may deliver twice; callers
/// accept duplicates over silent loss.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str, destination: &Destination) -> Result<(), NotifyError>;
}

/// Writes reports to the log. Used when no chat channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str, destination: &Destination) -> Result<(), NotifyError> {
        info!(chat_id = %destination.chat_id, report = %text, "report:\n{}", text);
        Ok(())
    }
}
