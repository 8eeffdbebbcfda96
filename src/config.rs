//! Run configuration: universe, spans, tolerance, timeframe profiles.
//!
//! Loaded once at startup (env, optional JSON file, `.env` via dotenvy),
//! validated, then shared read-only for the whole run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::indicators::{AverageSpans, IndicatorError};
use crate::models::{Interval, Lookback};
use crate::signals::evaluator::AverageRule;
use crate::signals::pattern::PatternCatalog;
use crate::signals::tolerance::{ComparisonMode, ToleranceComparator, ToleranceError};

/// Large-cap universe scanned when no symbol list is configured.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    "AIG", "AMZN", "AAPL", "AXP", "BA", "BAC", "BKNG", "BLK", "C", "CAT", "COST", "CSCO", "CVX",
    "DAL", "DD", "EXPE", "F", "GE", "GM", "GOOG", "GS", "HLT", "HPQ", "IBM", "INTC", "JNJ", "JPM",
    "KO", "MA", "MCD", "META", "MNST", "MS", "MSFT", "NFLX", "NVDA", "ORCL", "PEP", "PG", "PLTR",
    "PM", "RCL", "SBUX", "SPOT", "T", "TSLA", "UBER", "V", "WFC", "WMT", "XOM",
];

/// Broad US universe scanned by the daily and weekly presets.
pub const BROAD_UNIVERSE: &[&str] = &[
    "AA", "AAPL", "ABBV", "ABNB", "ACN", "ADBE", "ADI", "ADP", "AEP", "AIG", "AKAM", "AMAT", "AMD",
    "AMGN", "AMT", "AMZN", "ANET", "ANSS", "APPN", "APPS", "ATR", "ATVI", "AVGO", "AVY", "AWK",
    "AXON", "AXP", "AZO", "BA", "BAC", "BALL", "BAX", "BB", "BBY", "BDX", "BEN", "BF-B", "BIDU",
    "BIIB", "BILI", "BK", "BKNG", "BLK", "BMY", "BNS", "BRK-B", "BSX", "BURL", "BX", "BYD", "BYND",
    "BZUN", "C", "CAT", "CB", "CBOE", "CCI", "CHD", "CHGG", "CHWY", "CLX", "CM", "CMA", "CMCSA",
    "CME", "CMG", "CNC", "COP", "COST", "COUP", "CP", "CPB", "CPRI", "CPRT", "CRM", "CRWD", "CSCO",
    "CSX", "CTRA", "CVNA", "CVS", "CVX", "CYBR", "D", "DAL", "DAN", "DBX", "DD", "DE", "DELL", "DG",
    "DHR", "DIS", "DK", "DKNG", "DLR", "DLTR", "DOCU", "DT", "DUK", "DXC", "DXCM", "EA", "EBAY",
    "ECL", "ED", "EEFT", "EIX", "EL", "ENB", "ENPH", "EPR", "ETR", "ETSY", "EVBG", "EXAS", "EXPE",
    "F", "FANG", "FCX", "FDX", "FHN", "FITB", "FIVE", "FL", "FLR", "FOX", "FSLY", "FTI", "FTNT",
    "GDS", "GE", "GILD", "GM", "GOOG", "GPN", "GRMN", "GS", "GT", "HBAN", "HD", "HLT", "HOG",
    "HOLX", "HON", "HP", "HPQ", "HRL", "HUYA", "IAC", "IBKR", "IBM", "IDXX", "ILMN", "INCY", "INO",
    "INTC", "INTU", "IRBT", "ISRG", "J", "JNJ", "JPM", "JWN", "KEY", "KLAC", "KMB", "KMX", "KO",
    "LHX", "LIN", "LLY", "LMT", "LOW", "LRCX", "LULU", "LUMN", "LUV", "LYFT", "MA", "MAA", "MAC",
    "MAR", "MASI", "MAT", "MCD", "MDB", "MDLZ", "MDT", "MDXG", "MELI", "META", "MGM", "MKC", "MKTX",
    "MLM", "MMM", "MNST", "MO", "MPC", "MRK", "MRVL", "MS", "MSCI", "MSFT", "MTCH", "MTZ", "MU",
    "NEE", "NEM", "NET", "NFLX", "NICE", "NKE", "NOW", "NTAP", "NTRS", "NVDA", "NVO", "NVR", "NXPI",
    "NXST", "OC", "OKE", "OKTA", "OMC", "ORCL", "PAAS", "PANW", "PDD", "PEP", "PFE", "PG", "PGR",
    "PH", "PINS", "PLD", "PLNT", "PLTR", "PM", "PNC", "PNR", "PODD", "POOL", "PSO", "PYPL", "QCOM",
    "RAD", "RBLX", "RDFN", "RH", "RNG", "ROKU", "RTX", "SBAC", "SBUX", "SE", "SEDG", "SFIX", "SHAK",
    "SHOP", "SIRI", "SKX", "SNAP", "SNOW", "STT", "SWK", "SYK", "T", "TAP", "TDG", "TDOC", "TEAM",
    "TFC", "THO", "TJX", "TMO", "TMUS", "TRV", "TSLA", "TSN", "TTD", "TWLO", "TXN", "UAL", "UBER",
    "UI", "UNH", "UNP", "UPS", "URBN", "USB", "V", "VMW", "VZ", "W", "WBA", "WDAY", "WDC", "WEN",
    "WFC", "WHR", "WM", "WTW", "WYNN", "X", "XEL", "XOM", "YELP", "ZG", "ZTS",
];

const MIN_REPORT_LENGTH: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid average spans: {0}")]
    Spans(#[from] IndicatorError),

    #[error("invalid tolerance: {0}")]
    Tolerance(#[from] ToleranceError),

    #[error("at least one timeframe profile is required")]
    NoProfiles,

    #[error("duplicate timeframe profile '{0}'")]
    DuplicateProfile(String),

    #[error("concurrency must be at least 1")]
    Concurrency,

    #[error("fetch timeout must be at least 1 second")]
    FetchTimeout,

    #[error("notification retry policy needs at least one attempt")]
    RetryAttempts,

    #[error("report max_length must be at least 64 characters, got {0}")]
    ReportLength(usize),

    #[error("unknown preset '{0}' (expected d1, h1 or s1)")]
    UnknownPreset(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidVar { key: String, value: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Get the deployment environment (`ENVIRONMENT`, default `sandbox`).
pub fn get_environment() -> String {
    std::env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// One timeframe evaluated for every instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeProfile {
    pub name: String,
    pub interval: Interval,
    pub lookback: Lookback,
    /// `None` makes the profile confirmation-only (averages condition only).
    #[serde(default)]
    pub pattern: Option<PatternCatalog>,
    #[serde(default)]
    pub averages: AverageRule,
    #[serde(default)]
    pub comparison: ComparisonMode,
}

impl TimeframeProfile {
    pub fn confirmation(name: &str, interval: Interval, lookback: Lookback) -> Self {
        Self {
            name: name.to_string(),
            interval,
            lookback,
            pattern: None,
            averages: AverageRule::Independent,
            comparison: ComparisonMode::Tolerant,
        }
    }

    pub fn with_pattern(mut self, catalog: PatternCatalog) -> Self {
        self.pattern = Some(catalog);
        self
    }

    pub fn with_averages(mut self, rule: AverageRule) -> Self {
        self.averages = rule;
        self
    }

    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    /// Offset from UTC of the timestamp printed in the header.
    pub utc_offset_minutes: i32,
    pub max_length: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Radar US PDV".to_string(),
            utc_offset_minutes: -180,
            max_length: 4096,
        }
    }
}

/// Bounded exponential retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    pub min_delay_ms: u64,
}

impl RetryPolicy {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Retries after the first attempt.
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Sleep between all attempts, doubling from `min_delay`.
    pub fn total_backoff(&self) -> Duration {
        (0..self.retries())
            .map(|i| self.min_delay().saturating_mul(1u32 << i.min(16)))
            .sum()
    }

    /// Longest single attempt such that every attempt and the backoff
    /// between them fit inside `budget`.
    pub fn attempt_timeout(&self, budget: Duration) -> Duration {
        let attempts = u32::try_from(self.max_attempts.max(1)).unwrap_or(u32::MAX);
        let usable = budget
            .checked_sub(self.total_backoff())
            .filter(|d| !d.is_zero())
            .unwrap_or(budget);
        usable / attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Daily pullback pattern, weekly confirmation.
    D1,
    /// Hourly and daily averages, no pattern.
    H1,
    /// Weekly pressure pattern, monthly confirmation.
    S1,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d1" => Ok(Preset::D1),
            "h1" => Ok(Preset::H1),
            "s1" => Ok(Preset::S1),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

impl Preset {
    pub fn profiles(&self) -> Vec<TimeframeProfile> {
        match self {
            Preset::D1 => vec![
                TimeframeProfile::confirmation("daily", Interval::Day1, Lookback::days(400))
                    .with_pattern(PatternCatalog::pullback_four()),
                TimeframeProfile::confirmation("weekly", Interval::Week1, Lookback::years(5)),
            ],
            Preset::H1 => vec![
                TimeframeProfile::confirmation("hourly", Interval::Hour1, Lookback::days(180)),
                TimeframeProfile::confirmation("daily", Interval::Day1, Lookback::days(400)),
            ],
            Preset::S1 => vec![
                TimeframeProfile::confirmation("weekly", Interval::Week1, Lookback::years(5))
                    .with_pattern(PatternCatalog::pressure_six()),
                TimeframeProfile::confirmation("monthly", Interval::Month1, Lookback::months(400)),
            ],
        }
    }

    /// Symbols scanned when no list is configured.
    pub fn universe(&self) -> &'static [&'static str] {
        match self {
            Preset::D1 | Preset::S1 => BROAD_UNIVERSE,
            Preset::H1 => DEFAULT_UNIVERSE,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Preset::D1 => "Radar D1 US PDV",
            Preset::H1 => "Radar Pressão H1",
            Preset::S1 => "Radar S1 US PDV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_universe")]
    pub universe: Vec<String>,
    #[serde(default)]
    pub spans: AverageSpans,
    #[serde(default)]
    pub tolerance: ToleranceComparator,
    pub profiles: Vec<TimeframeProfile>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub notify_retry: RetryPolicy,
    /// Skip the run on weekends and exchange holidays.
    #[serde(default)]
    pub calendar_gate: bool,
}

fn default_universe() -> Vec<String> {
    DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect()
}

fn default_concurrency() -> usize {
    12
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

impl ScanConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            universe: preset.universe().iter().map(|s| s.to_string()).collect(),
            spans: AverageSpans::default(),
            tolerance: ToleranceComparator::default(),
            profiles: preset.profiles(),
            concurrency: default_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            report: ReportConfig {
                title: preset.title().to_string(),
                ..ReportConfig::default()
            },
            notify_retry: RetryPolicy::default(),
            calendar_gate: false,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the process environment, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source, then validate.
    ///
    /// `RADAR_CONFIG` names a JSON file; otherwise `RADAR_PRESET` picks a
    /// preset. The remaining `RADAR_*` variables override single fields.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("RADAR_CONFIG") {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => {
                let preset = lookup("RADAR_PRESET")
                    .map(|p| p.parse::<Preset>())
                    .transpose()?
                    .unwrap_or(Preset::D1);
                Self::preset(preset)
            }
        };

        if let Some(symbols) = lookup("RADAR_SYMBOLS") {
            config.universe = symbols.split(',').map(|s| s.to_string()).collect();
        }
        if let Some(v) = parse_var(&lookup, "RADAR_CONCURRENCY")? {
            config.concurrency = v;
        }
        if let Some(v) = parse_var(&lookup, "RADAR_FETCH_TIMEOUT_SECONDS")? {
            config.fetch_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "RADAR_EPS_ABS")? {
            config.tolerance.absolute = v;
        }
        if let Some(v) = parse_var(&lookup, "RADAR_EPS_REL")? {
            config.tolerance.relative = v;
        }
        if let Some(v) = parse_var(&lookup, "RADAR_CALENDAR_GATE")? {
            config.calendar_gate = v;
        }
        if let Some(title) = lookup("RADAR_TITLE") {
            config.report.title = title;
        }

        config.normalize_universe();
        config.validate()?;
        Ok(config)
    }

    /// Trims symbols, drops blanks and repeated entries, keeping first occurrence order.
    pub fn normalize_universe(&mut self) {
        let mut seen = HashSet::new();
        self.universe = self
            .universe
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }

    /// Startup checks. An empty universe is accepted: it yields an empty report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spans.validate()?;
        self.tolerance.validate()?;
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        let mut names = HashSet::new();
        for profile in &self.profiles {
            if !names.insert(profile.name.as_str()) {
                return Err(ConfigError::DuplicateProfile(profile.name.clone()));
            }
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Concurrency);
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::FetchTimeout);
        }
        if self.notify_retry.max_attempts == 0 {
            return Err(ConfigError::RetryAttempts);
        }
        if self.report.max_length < MIN_REPORT_LENGTH {
            return Err(ConfigError::ReportLength(self.report.max_length));
        }
        Ok(())
    }

    /// Profiles fastest interval first; ties keep their configured order.
    pub fn ordered_profiles(&self) -> Vec<TimeframeProfile> {
        let mut profiles = self.profiles.clone();
        profiles.sort_by_key(|p| p.interval.nominal_minutes());
        profiles
    }

    /// Worker count: the configured bound, never more than the universe size.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.min(self.universe.len()).max(1)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar {
                key: key.to_string(),
                value,
            }),
    }
}

/// Telegram bot credentials and destination.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    /// Numeric chat id or `@channel` name.
    pub chat_id: String,
    pub thread_id: Option<i64>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("thread_id", &self.thread_id)
            .finish()
    }
}

impl TelegramConfig {
    /// `None` when `TELEGRAM_TOKEN` or `TELEGRAM_CHAT_ID` is missing.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(token) = lookup("TELEGRAM_TOKEN").filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let Some(chat_id) = lookup("TELEGRAM_CHAT_ID")
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
        else {
            return Ok(None);
        };
        let thread_id = match lookup("TELEGRAM_THREAD_ID").filter(|t| !t.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                key: "TELEGRAM_THREAD_ID".to_string(),
                value: raw,
            })?),
            None => None,
        };
        Ok(Some(Self {
            token,
            chat_id,
            thread_id,
        }))
    }
}
