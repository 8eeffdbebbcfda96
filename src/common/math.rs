//! Moving-average arithmetic.

/// Smoothing factor of an exponential average with the given span: `2 / (span + 1)`.
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// One step of the recursive (non-adjusted) exponential average.
pub fn ema_from_previous(value: f64, previous: f64, span: usize) -> f64 {
    previous + smoothing_factor(span) * (value - previous)
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
