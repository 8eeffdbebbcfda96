//! Unit tests for the multi-timeframe scanner

use std::sync::Arc;

use radar::config::TimeframeProfile;
use radar::models::{Interval, Lookback, Rejection};
use radar::services::market_data::StaticMarketDataProvider;
use radar::signals::engine::MultiTimeframeScanner;

use crate::test_utils::{daily_and_weekly, falling_bars, rising_bars, small_config};

fn scanner(provider: Arc<StaticMarketDataProvider>) -> MultiTimeframeScanner {
    MultiTimeframeScanner::new(provider, &small_config(&["AAPL"], daily_and_weekly()))
}

#[test]
fn test_profiles_ordered_fastest_first() {
    let scanner = scanner(Arc::new(StaticMarketDataProvider::new()));
    let intervals: Vec<Interval> = scanner.profiles().iter().map(|p| p.interval).collect();
    assert_eq!(intervals, vec![Interval::Day1, Interval::Week1]);
}

#[tokio::test]
async fn test_passes_when_every_timeframe_passes() {
    let provider = Arc::new(
        StaticMarketDataProvider::new()
            .with_bars("AAPL", Interval::Day1, rising_bars(10, 100.0, 1.0))
            .with_bars("AAPL", Interval::Week1, rising_bars(10, 80.0, 2.0)),
    );
    let verdict = scanner(provider.clone()).scan("AAPL").await;
    assert!(verdict.pass);
    assert_eq!(verdict.per_timeframe.len(), 2);
    assert_eq!(provider.calls_for("AAPL"), vec![Interval::Day1, Interval::Week1]);
}

#[tokio::test]
async fn test_short_circuits_on_first_failure() {
    let provider = Arc::new(
        StaticMarketDataProvider::new()
            .with_bars("AAPL", Interval::Day1, falling_bars(10, 100.0, 1.0))
            .with_bars("AAPL", Interval::Week1, rising_bars(10, 80.0, 2.0)),
    );
    let verdict = scanner(provider.clone()).scan("AAPL").await;
    assert!(!verdict.pass);
    assert_eq!(verdict.per_timeframe.len(), 1);
    assert_eq!(verdict.rejection(), Some(&Rejection::FilterFailed));
    assert_eq!(provider.calls_for("AAPL"), vec![Interval::Day1]);
}

#[tokio::test]
async fn test_slow_timeframe_failure_fails_instrument() {
    let provider = Arc::new(
        StaticMarketDataProvider::new()
            .with_bars("AAPL", Interval::Day1, rising_bars(10, 100.0, 1.0))
            .with_bars("AAPL", Interval::Week1, falling_bars(10, 80.0, 2.0)),
    );
    let verdict = scanner(provider).scan("AAPL").await;
    assert!(!verdict.pass);
    assert!(verdict.per_timeframe[0].pass);
    assert!(!verdict.per_timeframe[1].pass);
}

#[tokio::test]
async fn test_fetch_error_is_recorded() {
    let provider = Arc::new(
        StaticMarketDataProvider::new().with_error("AAPL", Interval::Day1, "upstream 500"),
    );
    let verdict = scanner(provider).scan("AAPL").await;
    assert!(!verdict.pass);
    let rejection = verdict.rejection().unwrap();
    assert!(rejection.is_failure());
    assert!(matches!(rejection, Rejection::FetchFailed { message } if message.contains("upstream 500")));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_timeout() {
    let provider = Arc::new(StaticMarketDataProvider::new().with_hang("AAPL", Interval::Day1));
    let verdict = scanner(provider).scan("AAPL").await;
    assert_eq!(verdict.rejection(), Some(&Rejection::TimedOut { after_ms: 1_000 }));
}

#[tokio::test]
async fn test_profile_order_does_not_change_verdict() {
    let provider = Arc::new(
        StaticMarketDataProvider::new()
            .with_bars("UP", Interval::Day1, rising_bars(10, 100.0, 1.0))
            .with_bars("UP", Interval::Week1, rising_bars(10, 80.0, 2.0))
            .with_bars("MIXED", Interval::Day1, rising_bars(10, 100.0, 1.0))
            .with_bars("MIXED", Interval::Week1, falling_bars(10, 80.0, 2.0))
            .with_bars("DOWN", Interval::Day1, falling_bars(10, 100.0, 1.0))
            .with_bars("SHORT", Interval::Day1, rising_bars(3, 100.0, 1.0))
            .with_bars("SHORT", Interval::Week1, rising_bars(10, 80.0, 2.0)),
    );
    let config = small_config(&[], daily_and_weekly());
    let fastest_first = MultiTimeframeScanner::new(provider.clone(), &config);
    let reversed: Vec<TimeframeProfile> = fastest_first.profiles().iter().rev().cloned().collect();
    let slowest_first = MultiTimeframeScanner::new(provider, &config).with_profile_order(reversed);

    for symbol in ["UP", "MIXED", "DOWN", "SHORT", "MISSING"] {
        let a = fastest_first.scan(symbol).await;
        let b = slowest_first.scan(symbol).await;
        assert_eq!(a.pass, b.pass, "order changed the verdict for {symbol}");
    }
    assert!(fastest_first.scan("UP").await.pass);
}

#[tokio::test]
async fn test_pattern_profile_in_scan() {
    use radar::signals::pattern::PatternCatalog;
    let profiles = vec![
        TimeframeProfile::confirmation("daily", Interval::Day1, Lookback::days(400))
            .with_pattern(PatternCatalog::pullback_four()),
    ];
    let provider = Arc::new(
        StaticMarketDataProvider::new().with_bars("AAPL", Interval::Day1, rising_bars(10, 100.0, 1.0)),
    );
    let scanner = MultiTimeframeScanner::new(provider, &small_config(&["AAPL"], profiles));
    let verdict = scanner.scan("AAPL").await;
    assert!(!verdict.pass, "all-bull window is not a pullback");
    assert!(verdict.per_timeframe[0].above_averages);
}
