//! SMA (Simple Moving Average) indicator

use crate::common::math;

/// SMA aligned with `closes`: `None` until a full window of `span` closes exists.
pub fn calculate_sma(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if span == 0 || closes.len() < span {
        return out;
    }
    for (offset, window) in closes.windows(span).enumerate() {
        out[offset + span - 1] = math::mean(window);
    }
    out
}

/// SMA value on the most recent close.
pub fn latest_sma(closes: &[f64], span: usize) -> Option<f64> {
    if span == 0 || closes.len() < span {
        return None;
    }
    math::mean(&closes[closes.len() - span..])
}
