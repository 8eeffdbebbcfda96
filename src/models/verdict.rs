//! Per-timeframe, per-instrument and per-run outcomes of a scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::timeframe::Interval;

/// Why a timeframe did not pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Not enough bars to define every average. A normal outcome.
    InsufficientHistory { available: usize, required: usize },
    /// The pattern or the average condition was not met.
    FilterFailed,
    /// The provider returned an error for this timeframe.
    FetchFailed { message: String },
    /// The provider did not answer within the fetch timeout.
    TimedOut { after_ms: u64 },
    /// The evaluation task for the symbol panicked.
    Panicked { message: String },
    /// The evaluator was handed settings it cannot work with.
    Misconfigured { message: String },
}

impl Rejection {
    /// Anything other than an ordinary "did not pass".
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Rejection::FetchFailed { .. }
                | Rejection::TimedOut { .. }
                | Rejection::Panicked { .. }
                | Rejection::Misconfigured { .. }
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InsufficientHistory {
                available,
                required,
            } => write!(f, "insufficient-history ({available}/{required} bars)"),
            Rejection::FilterFailed => f.write_str("filter-failed"),
            Rejection::FetchFailed { message } => write!(f, "fetch-failed: {message}"),
            Rejection::TimedOut { after_ms } => write!(f, "timed-out after {after_ms}ms"),
            Rejection::Panicked { message } => write!(f, "panicked: {message}"),
            Rejection::Misconfigured { message } => write!(f, "misconfigured: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeVerdict {
    /// Name of the profile that produced the verdict.
    pub timeframe: String,
    pub interval: Interval,
    pub pattern_matched: bool,
    pub above_averages: bool,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

impl TimeframeVerdict {
    /// Combines both conditions; `reason` is set to `FilterFailed` when either is false.
    pub fn evaluated(
        timeframe: impl Into<String>,
        interval: Interval,
        pattern_matched: bool,
        above_averages: bool,
    ) -> Self {
        let pass = pattern_matched && above_averages;
        Self {
            timeframe: timeframe.into(),
            interval,
            pattern_matched,
            above_averages,
            pass,
            reason: (!pass).then_some(Rejection::FilterFailed),
        }
    }

    pub fn rejected(timeframe: impl Into<String>, interval: Interval, reason: Rejection) -> Self {
        Self {
            timeframe: timeframe.into(),
            interval,
            pattern_matched: false,
            above_averages: false,
            pass: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentVerdict {
    pub symbol: String,
    /// Verdicts in evaluation order. Evaluation stops at the first failing
    /// timeframe, so later timeframes may be absent.
    pub per_timeframe: Vec<TimeframeVerdict>,
    pub pass: bool,
    /// Set when the evaluation task itself died before producing verdicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Rejection>,
}

impl InstrumentVerdict {
    pub fn new(symbol: impl Into<String>, per_timeframe: Vec<TimeframeVerdict>) -> Self {
        let pass = !per_timeframe.is_empty() && per_timeframe.iter().all(|v| v.pass);
        Self {
            symbol: symbol.into(),
            per_timeframe,
            pass,
            failure: None,
        }
    }

    pub fn failed(symbol: impl Into<String>, reason: Rejection) -> Self {
        Self {
            symbol: symbol.into(),
            per_timeframe: Vec::new(),
            pass: false,
            failure: Some(reason),
        }
    }

    /// The task failure if any, otherwise the reason of the first failing timeframe.
    pub fn rejection(&self) -> Option<&Rejection> {
        self.failure.as_ref().or_else(|| {
            self.per_timeframe
                .iter()
                .find(|v| !v.pass)
                .and_then(|v| v.reason.as_ref())
        })
    }
}

/// A symbol excluded from the pass set because its evaluation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub reason: Rejection,
}

/// Outcome of one scan over the whole universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub timestamp: DateTime<Utc>,
    /// Passing symbols, sorted and de-duplicated.
    pub passing_symbols: Vec<String>,
    pub evaluated: usize,
    /// Symbols lost to fetch errors, timeouts or panics, sorted by symbol.
    pub failures: Vec<ScanFailure>,
}

impl ScanResult {
    /// Builds a result from verdicts collected in any order.
    pub fn from_verdicts(timestamp: DateTime<Utc>, verdicts: Vec<InstrumentVerdict>) -> Self {
        let evaluated = verdicts.len();
        let mut passing_symbols = Vec::new();
        let mut failures = Vec::new();

        for verdict in verdicts {
            if verdict.pass {
                passing_symbols.push(verdict.symbol);
                continue;
            }
            let reason = verdict.rejection().filter(|r| r.is_failure()).cloned();
            if let Some(reason) = reason {
                failures.push(ScanFailure {
                    symbol: verdict.symbol,
                    reason,
                });
            }
        }

        passing_symbols.sort();
        passing_symbols.dedup();
        failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        Self {
            timestamp,
            passing_symbols,
            evaluated,
            failures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.passing_symbols.is_empty()
    }
}
