//! One scheduled run: gate, scan, report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::ScanConfig;
use crate::core::runtime::UniverseScanner;
use crate::models::ScanResult;
use crate::reporting::{Delivery, ResultReporter};
use crate::services::calendar::TradingCalendar;
use crate::services::market_data::MarketDataProvider;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Exchange closed; nothing fetched, nothing sent.
    Skipped { date: NaiveDate },
    Completed {
        result: ScanResult,
        report: String,
        delivery: Delivery,
    },
}

impl RunOutcome {
    pub fn result(&self) -> Option<&ScanResult> {
        match self {
            RunOutcome::Completed { result, .. } => Some(result),
            RunOutcome::Skipped { .. } => None,
        }
    }
}

pub struct BatchJob {
    config: Arc<ScanConfig>,
    scanner: UniverseScanner,
    reporter: ResultReporter,
    calendar: Arc<dyn TradingCalendar>,
}

impl BatchJob {
    pub fn new(
        config: Arc<ScanConfig>,
        provider: Arc<dyn MarketDataProvider>,
        reporter: ResultReporter,
        calendar: Arc<dyn TradingCalendar>,
    ) -> Self {
        let scanner = UniverseScanner::from_config(provider, &config);
        Self {
            config,
            scanner,
            reporter,
            calendar,
        }
    }

    pub async fn run(&self) -> RunOutcome {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> RunOutcome {
        if self.config.calendar_gate {
            let date = self.calendar.exchange_date(now);
            if !self.calendar.is_trading_day(date) {
                info!(%date, "exchange closed on {}, skipping run", date);
                return RunOutcome::Skipped { date };
            }
        }

        info!(
            symbols = self.config.universe.len(),
            timeframes = self.config.profiles.len(),
            title = %self.config.report.title,
            "starting scan"
        );

        let result = self.scanner.run_at(&self.config.universe, now).await;
        let outcome = self.reporter.report(&result).await;

        RunOutcome::Completed {
            result,
            report: outcome.text,
            delivery: outcome.delivery,
        }
    }
}
