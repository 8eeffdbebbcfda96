//! Layered averages (fast EMA, mid EMA, long SMA) over a close series.

use serde::{Deserialize, Serialize};

use crate::indicators::error::IndicatorError;
use crate::indicators::trend::{calculate_ema, calculate_sma};

/// Spans of the three averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageSpans {
    pub fast: usize,
    pub mid: usize,
    pub long: usize,
}

impl AverageSpans {
    pub fn new(fast: usize, mid: usize, long: usize) -> Self {
        Self { fast, mid, long }
    }

    /// Bars needed before every average is defined.
    pub fn required_bars(&self) -> usize {
        self.fast.max(self.mid).max(self.long)
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.fast == 0 || self.mid == 0 || self.long == 0 {
            return Err(IndicatorError::InvalidSpan);
        }
        Ok(())
    }
}

impl Default for AverageSpans {
    fn default() -> Self {
        Self::new(21, 120, 200)
    }
}

/// Full average series, index-aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageSeries {
    pub fast: Vec<Option<f64>>,
    pub mid: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
}

impl AverageSeries {
    pub fn calculate(closes: &[f64], spans: AverageSpans) -> Self {
        Self {
            fast: calculate_ema(closes, spans.fast),
            mid: calculate_ema(closes, spans.mid),
            long: calculate_sma(closes, spans.long),
        }
    }
}

/// Close and the three averages on the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub fast_avg: f64,
    pub mid_avg: f64,
    pub long_avg: f64,
}

impl IndicatorSnapshot {
    /// Snapshot of the last close. Fails with `InsufficientHistory` whenever
    /// any of the averages is still undefined there.
    pub fn latest(closes: &[f64], spans: AverageSpans) -> Result<Self, IndicatorError> {
        spans.validate()?;

        let required = spans.required_bars();
        let insufficient = IndicatorError::InsufficientHistory {
            available: closes.len(),
            required,
        };
        let Some(&close) = closes.last() else {
            return Err(insufficient);
        };
        if closes.len() < required {
            return Err(insufficient);
        }

        let series = AverageSeries::calculate(closes, spans);
        let last = |values: &[Option<f64>]| values.last().copied().flatten();
        match (last(&series.fast), last(&series.mid), last(&series.long)) {
            (Some(fast_avg), Some(mid_avg), Some(long_avg)) => Ok(Self {
                close,
                fast_avg,
                mid_avg,
                long_avg,
            }),
            _ => Err(insufficient),
        }
    }
}
