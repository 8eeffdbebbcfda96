//! Signal evaluation: tolerance, pattern, per-timeframe and multi-timeframe verdicts.

pub mod engine;
pub mod evaluator;
pub mod pattern;
pub mod tolerance;

pub use engine::MultiTimeframeScanner;
pub use evaluator::{AverageRule, TimeframeEvaluator};
pub use pattern::{PatternCatalog, PatternError, PatternOutcome};
pub use tolerance::{ComparisonMode, ToleranceComparator, ToleranceError};
