use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// Fewer closes than the longest span needs.
    #[error("insufficient history: {available} bars available, {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("span must be at least 1")]
    InvalidSpan,
}
