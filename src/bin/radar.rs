//! Radar batch runner
//!
//! Runs one scan of the configured universe and sends the report. Meant to be
//! invoked by an external scheduler (cron, CI schedule).

use dotenvy::dotenv;
use radar::config::{get_environment, ScanConfig, TelegramConfig};
use radar::core::batch::{BatchJob, RunOutcome};
use radar::logging;
use radar::reporting::ResultReporter;
use radar::services::calendar::NyseCalendar;
use radar::services::market_data::MarketDataProvider;
use radar::services::notification::{Destination, LogNotifier, Notifier};
use radar::services::telegram::TelegramNotifier;
use radar::services::yahoo::YahooMarketDataProvider;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let environment = get_environment();
    info!(environment = %environment, "Starting Radar");

    let config = match ScanConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    let yahoo = match env::var("YAHOO_BASE_URL") {
        Ok(base_url) => {
            let client = reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; radar/0.1)")
                .build()?;
            YahooMarketDataProvider::with_client(&base_url, client)?
        }
        Err(_) => YahooMarketDataProvider::new()?,
    };
    let adjusted = env::var("YAHOO_ADJUSTED").is_ok_and(|v| v == "true" || v == "1");
    let yahoo = yahoo
        .with_adjusted(adjusted)
        .with_fetch_budget(config.fetch_timeout());
    if let Some(limit) = yahoo.attempt_timeout() {
        info!(attempt_timeout_ms = limit.as_millis() as u64, "Yahoo provider ready");
    }
    let provider: Arc<dyn MarketDataProvider> = Arc::new(yahoo);

    let (notifier, destination) = match TelegramConfig::from_env()? {
        Some(telegram) => {
            info!(chat_id = %telegram.chat_id, "Reporting to Telegram");
            let parse_mode = env::var("TELEGRAM_PARSE_MODE").ok();
            let notifier = TelegramNotifier::new(telegram.token)?.with_parse_mode(parse_mode);
            (
                Arc::new(notifier) as Arc<dyn Notifier>,
                Destination::new(telegram.chat_id).with_thread(telegram.thread_id),
            )
        }
        None => {
            warn!("TELEGRAM_TOKEN or TELEGRAM_CHAT_ID not set - report goes to the log only");
            (
                Arc::new(LogNotifier) as Arc<dyn Notifier>,
                Destination::new("log"),
            )
        }
    };

    let reporter = ResultReporter::new(
        notifier,
        destination,
        config.notify_retry,
        config.report.clone(),
    );
    let job = BatchJob::new(config, provider, reporter, Arc::new(NyseCalendar));

    match job.run().await {
        RunOutcome::Skipped { date } => {
            info!(%date, "Run skipped: market closed");
        }
        RunOutcome::Completed {
            result, delivery, ..
        } => {
            info!(
                evaluated = result.evaluated,
                passing = result.passing_symbols.len(),
                failures = result.failures.len(),
                delivered = delivery.is_delivered(),
                "Run complete"
            );
        }
    }

    Ok(())
}
