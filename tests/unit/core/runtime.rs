//! Unit tests for the universe scanner worker pool

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use radar::core::runtime::UniverseScanner;
use radar::models::{BarSeries, Interval, Lookback, Rejection};
use radar::services::error::ProviderError;
use radar::services::market_data::{MarketDataProvider, StaticMarketDataProvider};

use crate::test_utils::{daily_and_weekly, falling_bars, rising_bars, small_config};

fn provider() -> StaticMarketDataProvider {
    let mut provider = StaticMarketDataProvider::new();
    for symbol in ["AAA", "CCC", "EEE"] {
        provider = provider
            .with_bars(symbol, Interval::Day1, rising_bars(10, 100.0, 1.0))
            .with_bars(symbol, Interval::Week1, rising_bars(10, 80.0, 2.0));
    }
    provider
        .with_bars("BBB", Interval::Day1, falling_bars(10, 100.0, 1.0))
        .with_error("DDD", Interval::Day1, "connection reset")
}

fn universe() -> Vec<String> {
    ["AAA", "BBB", "CCC", "DDD", "EEE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn runner(provider: Arc<dyn MarketDataProvider>, concurrency: usize) -> UniverseScanner {
    let config = small_config(&[], daily_and_weekly());
    UniverseScanner::from_config(provider, &config).with_concurrency(concurrency)
}

#[tokio::test]
async fn test_collects_passing_symbols_and_failures() {
    let result = runner(Arc::new(provider()), 4).run(&universe()).await;
    assert_eq!(result.passing_symbols, vec!["AAA", "CCC", "EEE"]);
    assert_eq!(result.evaluated, 5);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].symbol, "DDD");
}

#[tokio::test(start_paused = true)]
async fn test_result_independent_of_concurrency_and_completion_order() {
    let delayed = Arc::new(
        provider()
            .with_delay("AAA", Duration::from_millis(300))
            .with_delay("CCC", Duration::from_millis(100)),
    );
    let sequential = runner(delayed.clone(), 1).run(&universe()).await;
    let parallel = runner(delayed, 5).run(&universe()).await;

    assert_eq!(sequential.passing_symbols, parallel.passing_symbols);
    assert_eq!(sequential.failures, parallel.failures);
    assert_eq!(sequential.evaluated, parallel.evaluated);
}

struct PanickingProvider {
    inner: StaticMarketDataProvider,
    poison: &'static str,
}

#[async_trait]
impl MarketDataProvider for PanickingProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        lookback: Lookback,
    ) -> Result<BarSeries, ProviderError> {
        if symbol == self.poison {
            panic!("corrupt payload for {symbol}");
        }
        self.inner.fetch_bars(symbol, interval, lookback).await
    }
}

#[tokio::test]
async fn test_panic_is_isolated_to_one_symbol() {
    let provider = Arc::new(PanickingProvider {
        inner: provider(),
        poison: "BBB",
    });
    let result = runner(provider, 2).run(&universe()).await;

    assert_eq!(result.passing_symbols, vec!["AAA", "CCC", "EEE"]);
    assert_eq!(result.evaluated, 5);
    let panicked = result
        .failures
        .iter()
        .find(|f| f.symbol == "BBB")
        .expect("panic recorded");
    assert!(matches!(&panicked.reason, Rejection::Panicked { message } if message.contains("corrupt payload")));
}

#[tokio::test]
async fn test_empty_universe() {
    let result = runner(Arc::new(provider()), 4).run(&[]).await;
    assert!(result.is_empty());
    assert_eq!(result.evaluated, 0);
}

#[tokio::test]
async fn test_each_symbol_scanned_once() {
    let provider = Arc::new(provider());
    runner(provider.clone(), 3).run(&universe()).await;
    assert_eq!(provider.calls_for("AAA"), vec![Interval::Day1, Interval::Week1]);
    assert_eq!(provider.calls_for("BBB"), vec![Interval::Day1]);
}

#[test]
fn test_concurrency_floor() {
    let scanner = runner(Arc::new(StaticMarketDataProvider::new()), 0);
    assert_eq!(scanner.concurrency(), 1);
}
