pub mod format;
pub mod reporter;

pub use format::{format_header, format_report, NO_SIGNALS};
pub use reporter::{Delivery, ReportOutcome, ResultReporter};
