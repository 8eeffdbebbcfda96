//! Delivery of the rendered report with bounded retry.

use backon::{ExponentialBuilder, Retryable};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{ReportConfig, RetryPolicy};
use crate::models::ScanResult;
use crate::reporting::format::format_report;
use crate::services::error::NotifyError;
use crate::services::notification::{Destination, Notifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Delivered { attempts: usize },
    Undelivered { attempts: usize, error: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Delivery::Delivered { attempts } | Delivery::Undelivered { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub text: String,
    pub delivery: Delivery,
}

/// Formats a [`ScanResult`] and sends it, retrying transient failures.
///
/// A report that cannot be delivered is written to the log at `error` level
/// along with the raw result, and the run still completes.
pub struct ResultReporter {
    notifier: Arc<dyn Notifier>,
    destination: Destination,
    retry: RetryPolicy,
    config: ReportConfig,
}

impl ResultReporter {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        destination: Destination,
        retry: RetryPolicy,
        config: ReportConfig,
    ) -> Self {
        Self {
            notifier,
            destination,
            retry,
            config,
        }
    }

    pub async fn report(&self, result: &ScanResult) -> ReportOutcome {
        let text = format_report(result, &self.config);
        let attempts = AtomicUsize::new(0);

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry.min_delay())
            .with_max_times(self.retry.retries());

        let counter = &attempts;
        let message = text.as_str();
        let sent = (|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            self.notifier.send(message, &self.destination).await
        })
        .retry(backoff)
        .notify(|e: &NotifyError, delay: Duration| {
            warn!(
                error = %e,
                delay_ms = delay.as_millis() as u64,
                "report delivery failed, retrying"
            );
        })
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        let delivery = match sent {
            Ok(()) => {
                info!(
                    attempts,
                    passing = result.passing_symbols.len(),
                    "report delivered"
                );
                Delivery::Delivered { attempts }
            }
            Err(e) => {
                let raw = serde_json::to_string(result).unwrap_or_default();
                error!(
                    attempts,
                    error = %e,
                    result = %raw,
                    "report undelivered after {} attempts:\n{}",
                    attempts,
                    text
                );
                Delivery::Undelivered {
                    attempts,
                    error: e.to_string(),
                }
            }
        };

        ReportOutcome { text, delivery }
    }
}
