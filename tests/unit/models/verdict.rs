//! Unit tests for verdicts and scan results

use chrono::Utc;
use radar::models::{InstrumentVerdict, Interval, Rejection, ScanResult, TimeframeVerdict};

fn passing(symbol: &str) -> InstrumentVerdict {
    InstrumentVerdict::new(
        symbol,
        vec![TimeframeVerdict::evaluated("daily", Interval::Day1, true, true)],
    )
}

fn filtered(symbol: &str) -> InstrumentVerdict {
    InstrumentVerdict::new(
        symbol,
        vec![TimeframeVerdict::evaluated("daily", Interval::Day1, false, true)],
    )
}

#[test]
fn test_timeframe_verdict_reason() {
    let pass = TimeframeVerdict::evaluated("daily", Interval::Day1, true, true);
    assert!(pass.pass);
    assert_eq!(pass.reason, None);

    let fail = TimeframeVerdict::evaluated("daily", Interval::Day1, true, false);
    assert!(!fail.pass);
    assert_eq!(fail.reason, Some(Rejection::FilterFailed));
}

#[test]
fn test_instrument_verdict_requires_every_timeframe() {
    let verdict = InstrumentVerdict::new(
        "AAPL",
        vec![
            TimeframeVerdict::evaluated("daily", Interval::Day1, true, true),
            TimeframeVerdict::evaluated("weekly", Interval::Week1, true, false),
        ],
    );
    assert!(!verdict.pass);
    assert_eq!(verdict.rejection(), Some(&Rejection::FilterFailed));

    assert!(!InstrumentVerdict::new("AAPL", Vec::new()).pass);
}

#[test]
fn test_scan_result_sorts_and_dedups() {
    let result = ScanResult::from_verdicts(
        Utc::now(),
        vec![passing("MSFT"), filtered("IBM"), passing("AAPL"), passing("MSFT")],
    );
    assert_eq!(result.passing_symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(result.evaluated, 4);
    assert!(result.failures.is_empty());
}

#[test]
fn test_scan_result_records_failures_only() {
    let insufficient = InstrumentVerdict::new(
        "NEW",
        vec![TimeframeVerdict::rejected(
            "daily",
            Interval::Day1,
            Rejection::InsufficientHistory {
                available: 10,
                required: 200,
            },
        )],
    );
    let fetch = InstrumentVerdict::new(
        "ZZZ",
        vec![TimeframeVerdict::rejected(
            "daily",
            Interval::Day1,
            Rejection::FetchFailed {
                message: "boom".to_string(),
            },
        )],
    );
    let panicked = InstrumentVerdict::failed(
        "BAD",
        Rejection::Panicked {
            message: "oops".to_string(),
        },
    );

    let result = ScanResult::from_verdicts(
        Utc::now(),
        vec![fetch, insufficient, filtered("IBM"), panicked],
    );
    assert!(result.is_empty());
    let symbols: Vec<&str> = result.failures.iter().map(|f| f.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BAD", "ZZZ"]);
}

#[test]
fn test_rejection_display() {
    let reason = Rejection::InsufficientHistory {
        available: 150,
        required: 200,
    };
    assert_eq!(reason.to_string(), "insufficient-history (150/200 bars)");
    assert_eq!(Rejection::FilterFailed.to_string(), "filter-failed");
    assert!(!reason.is_failure());
    assert!(Rejection::TimedOut { after_ms: 10 }.is_failure());
}
