//! Multi-timeframe technical scanner for equities.
//!
//! Each run fetches bars for every symbol on every configured timeframe,
//! applies the candle-pattern and moving-average filters, and sends the list
//! of symbols that pass all timeframes to a notification channel.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod reporting;
pub mod services;
pub mod signals;
