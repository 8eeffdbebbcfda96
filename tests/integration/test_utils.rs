//! Shared fixtures for the end-to-end tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use radar::config::{Preset, RetryPolicy, ScanConfig, TimeframeProfile};
use radar::core::batch::BatchJob;
use radar::indicators::AverageSpans;
use radar::models::Bar;
use radar::reporting::ResultReporter;
use radar::services::calendar::NyseCalendar;
use radar::services::error::NotifyError;
use radar::services::market_data::MarketDataProvider;
use radar::services::notification::{Destination, Notifier};

pub fn bar(close: f64, bull: bool, i: usize) -> Bar {
    let open = if bull { close - 0.5 } else { close + 0.5 };
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i as i64);
    Bar::new(open, open.max(close) + 0.5, open.min(close) - 0.5, close, 1_000.0, ts)
}

pub fn bars(closes: &[f64], bulls: &[bool]) -> Vec<Bar> {
    closes
        .iter()
        .zip(bulls)
        .enumerate()
        .map(|(i, (&close, &bull))| bar(close, bull, i))
        .collect()
}

pub fn rising(n: usize, start: f64) -> Vec<Bar> {
    (0..n).map(|i| bar(start + i as f64, true, i)).collect()
}

/// Records every delivered text; fails every send when `failing` is set.
#[derive(Default)]
pub struct RecordingNotifier {
    pub failing: bool,
    pub sent: Mutex<Vec<String>>,
    pub attempts: Mutex<usize>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str, _destination: &Destination) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;
        if self.failing {
            return Err(NotifyError::Api {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn config(universe: &[&str], spans: AverageSpans, profiles: Vec<TimeframeProfile>) -> ScanConfig {
    let mut config = ScanConfig::preset(Preset::D1);
    config.universe = universe.iter().map(|s| s.to_string()).collect();
    config.spans = spans;
    config.profiles = profiles;
    config.fetch_timeout_secs = 2;
    config.notify_retry = RetryPolicy {
        max_attempts: 2,
        min_delay_ms: 1,
    };
    config
}

pub fn job(
    config: ScanConfig,
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<RecordingNotifier>,
) -> BatchJob {
    let reporter = ResultReporter::new(
        notifier,
        Destination::new("-100"),
        config.notify_retry,
        config.report.clone(),
    );
    BatchJob::new(Arc::new(config), provider, reporter, Arc::new(NyseCalendar))
}

/// Tuesday 2024-03-12 21:00 UTC, after the US close.
pub fn weekday_evening() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 12, 21, 0, 0).unwrap()
}

/// Saturday 2024-03-16 21:00 UTC.
pub fn saturday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 16, 21, 0, 0).unwrap()
}
