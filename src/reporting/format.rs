//! Plain-text rendering of a scan result.

use chrono::{FixedOffset, Offset, Utc};

use crate::config::ReportConfig;
use crate::models::ScanResult;

/// Body used when nothing passed. Sent on every run so recipients can tell
/// "no signals" apart from "did not run".
pub const NO_SIGNALS: &str = "No signals found.";

const SIGNALS_PREFIX: &str = "Buy signals: ";
const SEPARATOR: &str = ", ";

/// Header line: title plus the result timestamp in the configured offset.
pub fn format_header(result: &ScanResult, config: &ReportConfig) -> String {
    let offset =
        FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let local = result.timestamp.with_timezone(&offset);
    format!("{} — {}", config.title, local.format("%d/%m/%Y %H:%M"))
}

/// Full report text, never longer than `max_length` characters.
///
/// Symbols that do not fit are dropped from the tail and counted in a
/// `… (+N more)` suffix.
pub fn format_report(result: &ScanResult, config: &ReportConfig) -> String {
    let header = format_header(result, config);
    let symbols = &result.passing_symbols;

    if symbols.is_empty() {
        return clip(format!("{header}\n\n{NO_SIGNALS}"), config.max_length);
    }

    let full = format!("{header}\n\n{SIGNALS_PREFIX}{}", symbols.join(SEPARATOR));
    if full.chars().count() <= config.max_length {
        return full;
    }

    for kept in (0..symbols.len()).rev() {
        let listed = symbols[..kept].join(SEPARATOR);
        let joiner = if kept > 0 { SEPARATOR } else { "" };
        let text = format!(
            "{header}\n\n{SIGNALS_PREFIX}{listed}{joiner}… (+{} more)",
            symbols.len() - kept
        );
        if text.chars().count() <= config.max_length {
            return text;
        }
    }

    clip(
        format!("{header}\n\n{SIGNALS_PREFIX}… (+{} more)", symbols.len()),
        config.max_length,
    )
}

fn clip(text: String, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text
    } else {
        text.chars().take(max_length).collect()
    }
}
