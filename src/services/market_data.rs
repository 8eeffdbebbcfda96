//! Market data provider interface and an in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{Bar, BarSeries, Interval, Lookback};
use crate::services::error::ProviderError;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars for `symbol` on `interval` reaching back `lookback`.
    ///
    /// An empty series is a valid answer meaning "nothing to evaluate".
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError>;
}

#[derive(Debug, Clone)]
enum Entry {
    Bars(Vec<Bar>),
    Error(String),
    Hang,
}

/// Serves pre-loaded series. Unknown (symbol, interval) pairs yield an empty series.
///
/// Every call is recorded so callers can check which fetches happened.
#[derive(Debug, Default)]
pub struct StaticMarketDataProvider {
    entries: HashMap<(String, Interval), Entry>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, Interval)>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, interval: Interval, bars: Vec<Bar>) -> Self {
        self.entries
            .insert((symbol.to_string(), interval), Entry::Bars(bars));
        self
    }

    pub fn with_error(mut self, symbol: &str, interval: Interval, message: &str) -> Self {
        self.entries.insert(
            (symbol.to_string(), interval),
            Entry::Error(message.to_string()),
        );
        self
    }

    /// The fetch never completes.
    pub fn with_hang(mut self, symbol: &str, interval: Interval) -> Self {
        self.entries.insert((symbol.to_string(), interval), Entry::Hang);
        self
    }

    /// Delays every fetch for `symbol`.
    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, Interval)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn calls_for(&self, symbol: &str) -> Vec<Interval> {
        self.calls()
            .into_iter()
            .filter(|(s, _)| s == symbol)
            .map(|(_, interval)| interval)
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        _lookback: Lookback,
    ) -> Result<BarSeries, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((symbol.to_string(), interval));
        }

        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }

        match self.entries.get(&(symbol.to_string(), interval)) {
            Some(Entry::Bars(bars)) => Ok(BarSeries::new(symbol, interval, bars.clone())),
            Some(Entry::Error(message)) => Err(ProviderError::Api {
                message: message.clone(),
            }),
            Some(Entry::Hang) => std::future::pending().await,
            None => Ok(BarSeries::empty(symbol, interval)),
        }
    }
}
