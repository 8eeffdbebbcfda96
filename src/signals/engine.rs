//! Multi-timeframe evaluation of one instrument.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ScanConfig, TimeframeProfile};
use crate::models::{InstrumentVerdict, Rejection, TimeframeVerdict};
use crate::services::market_data::MarketDataProvider;
use crate::signals::evaluator::TimeframeEvaluator;

/// Fetches and evaluates each profile in priority order (fastest first),
/// stopping at the first profile that fails.
///
/// Stopping early only saves fetches: the verdict is the AND of all profiles
/// either way.
pub struct MultiTimeframeScanner {
    provider: Arc<dyn MarketDataProvider>,
    evaluator: TimeframeEvaluator,
    profiles: Vec<TimeframeProfile>,
    fetch_timeout: Duration,
}

impl MultiTimeframeScanner {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &ScanConfig) -> Self {
        Self {
            provider,
            evaluator: TimeframeEvaluator::new(config.spans, config.tolerance),
            profiles: config.ordered_profiles(),
            fetch_timeout: config.fetch_timeout(),
        }
    }

    /// Replaces the evaluation order. Used to check that order never changes verdicts.
    pub fn with_profile_order(mut self, profiles: Vec<TimeframeProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn profiles(&self) -> &[TimeframeProfile] {
        &self.profiles
    }

    pub async fn scan(&self, symbol: &str) -> InstrumentVerdict {
        let mut verdicts = Vec::with_capacity(self.profiles.len());

        for profile in &self.profiles {
            let verdict = self.evaluate_profile(symbol, profile).await;
            let pass = verdict.pass;
            verdicts.push(verdict);
            if !pass {
                break;
            }
        }

        let verdict = InstrumentVerdict::new(symbol, verdicts);
        debug!(
            symbol = %symbol,
            pass = verdict.pass,
            evaluated = verdict.per_timeframe.len(),
            "instrument evaluated"
        );
        verdict
    }

    async fn evaluate_profile(&self, symbol: &str, profile: &TimeframeProfile) -> TimeframeVerdict {
        let fetch = self
            .provider
            .fetch_bars(symbol, profile.interval, profile.lookback);

        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(series)) => self.evaluator.evaluate(profile, &series),
            Ok(Err(e)) => {
                warn!(
                    symbol = %symbol,
                    timeframe = %profile.name,
                    error = %e,
                    "failed to fetch {} bars for {}",
                    profile.interval,
                    symbol
                );
                TimeframeVerdict::rejected(
                    &profile.name,
                    profile.interval,
                    Rejection::FetchFailed {
                        message: e.to_string(),
                    },
                )
            }
            Err(_) => {
                let after_ms = self.fetch_timeout.as_millis() as u64;
                warn!(
                    symbol = %symbol,
                    timeframe = %profile.name,
                    timeout_ms = after_ms,
                    "fetch of {} bars for {} timed out",
                    profile.interval,
                    symbol
                );
                TimeframeVerdict::rejected(
                    &profile.name,
                    profile.interval,
                    Rejection::TimedOut { after_ms },
                )
            }
        }
    }
}
