//! EMA (Exponential Moving Average) indicator
//!
//! Recursive form seeded with the arithmetic mean of the first `span` closes:
//!
//! ```text
//! ema[span - 1] = mean(close[0..span])
//! ema[i]        = ema[i - 1] + (2 / (span + 1)) * (close[i] - ema[i - 1])
//! ```
//!
//! The bias-adjusted "weighted average of all history" form produces a
//! different series and is not used anywhere in the crate.

use crate::common::math;

/// EMA aligned with `closes`: `None` until index `span - 1`, defined afterwards.
///
/// A zero span yields an all-`None` series.
pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if span == 0 || closes.len() < span {
        return out;
    }

    let Some(seed) = math::mean(&closes[..span]) else {
        return out;
    };
    out[span - 1] = Some(seed);

    let mut previous = seed;
    for (i, &close) in closes.iter().enumerate().skip(span) {
        previous = math::ema_from_previous(close, previous, span);
        out[i] = Some(previous);
    }
    out
}

/// EMA value on the most recent close.
pub fn latest_ema(closes: &[f64], span: usize) -> Option<f64> {
    calculate_ema(closes, span).last().copied().flatten()
}
