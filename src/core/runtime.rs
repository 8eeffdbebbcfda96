//! Bounded worker pool that scans the whole instrument universe.

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

use crate::config::ScanConfig;
use crate::models::{InstrumentVerdict, Rejection, ScanResult};
use crate::services::market_data::MarketDataProvider;
use crate::signals::engine::MultiTimeframeScanner;

/// Runs [`MultiTimeframeScanner`] for every symbol on a fixed number of
/// workers pulling from a shared queue. Verdicts are fanned in over a channel;
/// the collector is the only state the workers share.
pub struct UniverseScanner {
    scanner: Arc<MultiTimeframeScanner>,
    concurrency: usize,
}

impl UniverseScanner {
    pub fn new(scanner: MultiTimeframeScanner, concurrency: usize) -> Self {
        Self {
            scanner: Arc::new(scanner),
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(provider: Arc<dyn MarketDataProvider>, config: &ScanConfig) -> Self {
        Self::new(
            MultiTimeframeScanner::new(provider, config),
            config.effective_concurrency(),
        )
    }

    /// Set custom concurrency
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scan every symbol. Per-symbol failures are recorded in the result,
    /// never propagated.
    pub async fn run(&self, universe: &[String]) -> ScanResult {
        self.run_at(universe, Utc::now()).await
    }

    /// Same as [`run`](Self::run), stamping the result with `timestamp`.
    pub async fn run_at(&self, universe: &[String], timestamp: DateTime<Utc>) -> ScanResult {
        let started = Instant::now();
        let workers = self.concurrency.min(universe.len()).max(1);

        info!(
            symbols = universe.len(),
            workers,
            "UniverseScanner: scanning {} symbols with {} workers",
            universe.len(),
            workers
        );

        let queue: Arc<Mutex<VecDeque<String>>> =
            Arc::new(Mutex::new(universe.iter().cloned().collect()));
        let (tx, mut rx) = mpsc::unbounded_channel::<InstrumentVerdict>();

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = queue.clone();
            let tx = tx.clone();
            let scanner = self.scanner.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let Some(symbol) = queue.lock().await.pop_front() else {
                        break;
                    };
                    let verdict = match AssertUnwindSafe(scanner.scan(&symbol))
                        .catch_unwind()
                        .await
                    {
                        Ok(verdict) => verdict,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            error!(
                                symbol = %symbol,
                                worker,
                                panic = %message,
                                "UniverseScanner: evaluation of {} panicked",
                                symbol
                            );
                            InstrumentVerdict::failed(&symbol, Rejection::Panicked { message })
                        }
                    };
                    if tx.send(verdict).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let mut verdicts = Vec::with_capacity(universe.len());
        while let Some(verdict) = rx.recv().await {
            verdicts.push(verdict);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "UniverseScanner: worker terminated abnormally");
            }
        }

        let result = ScanResult::from_verdicts(timestamp, verdicts);
        info!(
            evaluated = result.evaluated,
            passing = result.passing_symbols.len(),
            failures = result.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "UniverseScanner: scan complete, {} of {} symbols passed",
            result.passing_symbols.len(),
            result.evaluated
        );
        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
