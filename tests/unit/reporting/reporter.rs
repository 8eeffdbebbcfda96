//! Unit tests for report delivery and retry

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use radar::config::{ReportConfig, RetryPolicy};
use radar::models::ScanResult;
use radar::reporting::{Delivery, ResultReporter, NO_SIGNALS};
use radar::services::error::NotifyError;
use radar::services::notification::{Destination, LogNotifier, Notifier};

/// Fails the first `failures` sends, then succeeds.
struct FlakyNotifier {
    failures: usize,
    calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl FlakyNotifier {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send(&self, text: &str, _destination: &Destination) -> Result<(), NotifyError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(NotifyError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn empty_result() -> ScanResult {
    ScanResult::from_verdicts(Utc::now(), Vec::new())
}

fn reporter(notifier: Arc<dyn Notifier>, max_attempts: usize) -> ResultReporter {
    ResultReporter::new(
        notifier,
        Destination::new("-100123"),
        RetryPolicy {
            max_attempts,
            min_delay_ms: 10,
        },
        ReportConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_delivered_after_transient_failures() {
    let notifier = Arc::new(FlakyNotifier::new(2));
    let outcome = reporter(notifier.clone(), 3).report(&empty_result()).await;

    assert_eq!(outcome.delivery, Delivery::Delivered { attempts: 3 });
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].ends_with(NO_SIGNALS));
}

#[tokio::test(start_paused = true)]
async fn test_undelivered_after_exhausting_retries() {
    let notifier = Arc::new(FlakyNotifier::new(10));
    let outcome = reporter(notifier.clone(), 3).report(&empty_result()).await;

    assert!(!outcome.delivery.is_delivered());
    assert_eq!(outcome.delivery.attempts(), 3);
    assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    assert!(outcome.text.ends_with(NO_SIGNALS));
}

#[tokio::test]
async fn test_single_attempt_policy() {
    let notifier = Arc::new(FlakyNotifier::new(1));
    let outcome = reporter(notifier.clone(), 1).report(&empty_result()).await;
    assert!(matches!(outcome.delivery, Delivery::Undelivered { attempts: 1, .. }));
}

#[tokio::test]
async fn test_log_notifier_always_delivers() {
    let outcome = reporter(Arc::new(LogNotifier), 3).report(&empty_result()).await;
    assert_eq!(outcome.delivery, Delivery::Delivered { attempts: 1 });
}
