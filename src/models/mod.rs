//! Shared data models spanning the engine layers.

pub mod bar;
pub mod timeframe;
pub mod verdict;

pub use bar::{Bar, BarSeries};
pub use timeframe::{Interval, Lookback, LookbackUnit, TimeframeError};
pub use verdict::{InstrumentVerdict, Rejection, ScanFailure, ScanResult, TimeframeVerdict};
