//! Single-timeframe verdict: averages condition AND candle pattern.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::TimeframeProfile;
use crate::indicators::{AverageSpans, IndicatorError, IndicatorSnapshot};
use crate::models::{BarSeries, Rejection, TimeframeVerdict};
use crate::signals::pattern::describe;
use crate::signals::tolerance::{ComparisonMode, ToleranceComparator};

/// How the close must relate to the three averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageRule {
    /// Close at least each average, independently.
    #[default]
    Independent,
    /// Ordered ladder: close >= fast >= mid >= long.
    Ladder,
}

/// Pure evaluator shared by every profile of a run.
#[derive(Debug, Clone, Copy)]
pub struct TimeframeEvaluator {
    spans: AverageSpans,
    comparator: ToleranceComparator,
}

impl TimeframeEvaluator {
    pub fn new(spans: AverageSpans, comparator: ToleranceComparator) -> Self {
        Self { spans, comparator }
    }

    pub fn above_averages(
        &self,
        snapshot: &IndicatorSnapshot,
        rule: AverageRule,
        mode: ComparisonMode,
    ) -> bool {
        let ge = |a: f64, b: f64| self.comparator.compare(mode, a, b);
        match rule {
            AverageRule::Independent => {
                ge(snapshot.close, snapshot.fast_avg)
                    && ge(snapshot.close, snapshot.mid_avg)
                    && ge(snapshot.close, snapshot.long_avg)
            }
            AverageRule::Ladder => {
                ge(snapshot.close, snapshot.fast_avg)
                    && ge(snapshot.fast_avg, snapshot.mid_avg)
                    && ge(snapshot.mid_avg, snapshot.long_avg)
            }
        }
    }

    pub fn evaluate(&self, profile: &TimeframeProfile, series: &BarSeries) -> TimeframeVerdict {
        let closes = series.closes();
        let snapshot = match IndicatorSnapshot::latest(&closes, self.spans) {
            Ok(snapshot) => snapshot,
            Err(IndicatorError::InsufficientHistory {
                available,
                required,
            }) => {
                debug!(
                    symbol = %series.symbol,
                    timeframe = %profile.name,
                    available,
                    required,
                    "insufficient history for {} on {}",
                    series.symbol,
                    profile.name
                );
                return TimeframeVerdict::rejected(
                    &profile.name,
                    profile.interval,
                    Rejection::InsufficientHistory {
                        available,
                        required,
                    },
                );
            }
            Err(e @ IndicatorError::InvalidSpan) => {
                error!(
                    symbol = %series.symbol,
                    timeframe = %profile.name,
                    error = %e,
                    "cannot evaluate {} on {}",
                    series.symbol,
                    profile.name
                );
                return TimeframeVerdict::rejected(
                    &profile.name,
                    profile.interval,
                    Rejection::Misconfigured {
                        message: e.to_string(),
                    },
                );
            }
        };

        let above_averages = self.above_averages(&snapshot, profile.averages, profile.comparison);

        let pattern_matched = match &profile.pattern {
            Some(catalog) => {
                let outcome = catalog.evaluate(series.bars());
                debug!(
                    symbol = %series.symbol,
                    timeframe = %profile.name,
                    observed = %outcome.observed.as_deref().map(describe).unwrap_or_default(),
                    matched = outcome.matched,
                    "pattern evaluated"
                );
                outcome.matched
            }
            None => true,
        };

        debug!(
            symbol = %series.symbol,
            timeframe = %profile.name,
            close = snapshot.close,
            fast = snapshot.fast_avg,
            mid = snapshot.mid_avg,
            long = snapshot.long_avg,
            above_averages,
            pattern_matched,
            "timeframe evaluated"
        );

        TimeframeVerdict::evaluated(&profile.name, profile.interval, pattern_matched, above_averages)
    }
}
