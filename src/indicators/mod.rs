pub mod error;
pub mod snapshot;

pub mod trend;

pub use error::IndicatorError;
pub use snapshot::{AverageSeries, AverageSpans, IndicatorSnapshot};
