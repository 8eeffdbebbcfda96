//! Price bars and the per-(symbol, interval) series built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeframe::Interval;

/// A single OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Close strictly above open. A doji (close == open) counts as a bear bar.
    pub fn is_bull(&self) -> bool {
        self.close > self.open
    }
}

/// Bars for one symbol on one interval, strictly ordered by timestamp.
///
/// Built fresh for every evaluation and dropped once the verdict exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: String,
    pub interval: Interval,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Builds a series, sorting by timestamp and collapsing duplicate
    /// timestamps onto the last occurrence (providers re-send the live bar).
    pub fn new(symbol: impl Into<String>, interval: Interval, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        let mut ordered: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match ordered.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => ordered.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            interval,
            bars: ordered,
        }
    }

    pub fn empty(symbol: impl Into<String>, interval: Interval) -> Self {
        Self::new(symbol, interval, Vec::new())
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `n` bars, or `None` when fewer are available.
    pub fn tail(&self, n: usize) -> Option<&[Bar]> {
        if n > self.bars.len() {
            return None;
        }
        Some(&self.bars[self.bars.len() - n..])
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
