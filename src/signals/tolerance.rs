//! Tolerance-aware "at least" comparison for prices near their averages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToleranceError {
    #[error("absolute tolerance must be finite and > 0, got {0}")]
    Absolute(f64),

    #[error("relative tolerance must be finite and >= 0, got {0}")]
    Relative(f64),
}

/// How a close is compared against an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// `a + tolerance >= b`.
    #[default]
    Tolerant,
    /// Raw `a > b`, no slack.
    Strict,
}

/// `at_least(a, b)` holds when `a + max(absolute, relative * |b|) >= b`.
///
/// The absolute floor is always positive so the band never collapses to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceComparator {
    pub absolute: f64,
    pub relative: f64,
}

impl ToleranceComparator {
    pub fn new(absolute: f64, relative: f64) -> Result<Self, ToleranceError> {
        let comparator = Self { absolute, relative };
        comparator.validate()?;
        Ok(comparator)
    }

    pub fn validate(&self) -> Result<(), ToleranceError> {
        if !self.absolute.is_finite() || self.absolute <= 0.0 {
            return Err(ToleranceError::Absolute(self.absolute));
        }
        if !self.relative.is_finite() || self.relative < 0.0 {
            return Err(ToleranceError::Relative(self.relative));
        }
        Ok(())
    }

    /// Slack granted when comparing against `b`.
    pub fn tolerance(&self, b: f64) -> f64 {
        self.absolute.max(self.relative * b.abs())
    }

    pub fn at_least(&self, a: f64, b: f64) -> bool {
        a + self.tolerance(b) >= b
    }

    pub fn compare(&self, mode: ComparisonMode, a: f64, b: f64) -> bool {
        match mode {
            ComparisonMode::Tolerant => self.at_least(a, b),
            ComparisonMode::Strict => a > b,
        }
    }
}

impl Default for ToleranceComparator {
    /// Two cents absolute, 0.1% relative.
    fn default() -> Self {
        Self {
            absolute: 0.02,
            relative: 0.001,
        }
    }
}
