//! Yahoo Finance chart-API market data provider.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::RetryPolicy;
use crate::models::{Bar, BarSeries, Interval, Lookback};
use crate::services::error::ProviderError;
use crate::services::market_data::MarketDataProvider;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; radar/0.1)";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Fetches bars from `/v8/finance/chart/{symbol}`.
///
/// Rows without an open or a close are dropped. Transport errors, 5xx and 429
/// responses are retried with exponential backoff. With a fetch budget set,
/// each attempt is cut short so that the retries still fit inside it.
pub struct YahooMarketDataProvider {
    client: reqwest::Client,
    base_url: Url,
    adjusted: bool,
    retry: RetryPolicy,
    fetch_budget: Option<Duration>,
}

impl YahooMarketDataProvider {
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Self::with_client(DEFAULT_BASE_URL, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            adjusted: false,
            retry: RetryPolicy {
                max_attempts: 3,
                min_delay_ms: 250,
            },
            fetch_budget: None,
        })
    }

    /// Rescale OHLC by `adjclose / close` (split and dividend adjusted bars).
    pub fn with_adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = adjusted;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Wall-clock time one `fetch_bars` call may take, retries included.
    /// Match it to the scanner's fetch timeout.
    pub fn with_fetch_budget(mut self, budget: Duration) -> Self {
        self.fetch_budget = Some(budget);
        self
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.fetch_budget.map(|budget| self.retry.attempt_timeout(budget))
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed {
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    async fn fetch_once(
        &self,
        url: &Url,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<ChartEnvelope, ProviderError> {
        let range = lookback.to_string();
        let response = self
            .client
            .get(url.clone())
            .query(&[
                ("interval", interval.code()),
                ("range", range.as_str()),
                ("includePrePost", "false"),
                ("events", "div,splits"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<ChartEnvelope>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ProviderError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(ProviderError::Malformed {
                message: e.to_string(),
            }),
        }
    }

    async fn fetch_attempt(
        &self,
        url: &Url,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<ChartEnvelope, ProviderError> {
        let Some(limit) = self.attempt_timeout() else {
            return self.fetch_once(url, interval, lookback).await;
        };
        tokio::time::timeout(limit, self.fetch_once(url, interval, lookback))
            .await
            .map_err(|_| ProviderError::Timeout {
                after_ms: limit.as_millis() as u64,
            })?
    }

    fn to_bars(&self, result: ChartResult) -> Vec<Bar> {
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = result
            .indicators
            .adjclose
            .into_iter()
            .next()
            .unwrap_or_default()
            .adjclose;
        let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let (Some(open), Some(close)) = (at(&quote.open, i), at(&quote.close, i)) else {
                continue;
            };
            if !open.is_finite() || !close.is_finite() {
                continue;
            }
            let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
                continue;
            };
            let high = at(&quote.high, i).unwrap_or(open.max(close));
            let low = at(&quote.low, i).unwrap_or(open.min(close));
            let volume = at(&quote.volume, i).unwrap_or(0.0);

            let ratio = match at(&adjclose, i) {
                Some(adj) if self.adjusted && close != 0.0 && adj.is_finite() => adj / close,
                _ => 1.0,
            };

            bars.push(Bar::new(
                open * ratio,
                high * ratio,
                low * ratio,
                close * ratio,
                volume,
                timestamp,
            ));
        }
        bars
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError> {
        let url = self.chart_url(symbol)?;
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry.min_delay())
            .with_max_times(self.retry.retries());

        let envelope = (|| self.fetch_attempt(&url, interval, lookback))
            .retry(backoff)
            .when(ProviderError::is_transient)
            .notify(|e: &ProviderError, delay: Duration| {
                warn!(
                    symbol = %symbol,
                    interval = %interval,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "retrying market data fetch for {}",
                    symbol
                );
            })
            .await?;

        if let Some(error) = envelope.chart.error {
            return Err(ProviderError::Api {
                message: format!("{}: {}", error.code, error.description),
            });
        }

        let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(BarSeries::empty(symbol, interval));
        };

        let bars = self.to_bars(result);
        debug!(
            symbol = %symbol,
            interval = %interval,
            range = %lookback,
            bars = bars.len(),
            "fetched {} bars for {}",
            bars.len(),
            symbol
        );
        Ok(BarSeries::new(symbol, interval, bars))
    }
}
