//! Bar intervals and lookback windows understood by the market-data providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeframeError {
    #[error("unknown interval '{0}'")]
    UnknownInterval(String),

    #[error("invalid lookback '{0}': expected <amount><d|wk|mo|y>")]
    InvalidLookback(String),
}

/// Width of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "60m")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    /// Provider code for the interval (`60m`, `1d`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Interval::Minute15 => "15m",
            Interval::Hour1 => "60m",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }

    /// Nominal bar width in minutes, used to order profiles fastest first.
    pub fn nominal_minutes(&self) -> u32 {
        match self {
            Interval::Minute15 => 15,
            Interval::Hour1 => 60,
            Interval::Day1 => 60 * 24,
            Interval::Week1 => 60 * 24 * 7,
            Interval::Month1 => 60 * 24 * 30,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15m" => Ok(Interval::Minute15),
            "60m" | "1h" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "1wk" => Ok(Interval::Week1),
            "1mo" => Ok(Interval::Month1),
            other => Err(TimeframeError::UnknownInterval(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookbackUnit {
    Day,
    Week,
    Month,
    Year,
}

impl LookbackUnit {
    fn suffix(&self) -> &'static str {
        match self {
            LookbackUnit::Day => "d",
            LookbackUnit::Week => "wk",
            LookbackUnit::Month => "mo",
            LookbackUnit::Year => "y",
        }
    }
}

/// How far back a fetch reaches, e.g. `400d`, `5y`, `400mo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Lookback {
    pub amount: u32,
    pub unit: LookbackUnit,
}

impl Lookback {
    pub fn new(amount: u32, unit: LookbackUnit) -> Self {
        Self { amount, unit }
    }

    pub fn days(amount: u32) -> Self {
        Self::new(amount, LookbackUnit::Day)
    }

    pub fn months(amount: u32) -> Self {
        Self::new(amount, LookbackUnit::Month)
    }

    pub fn years(amount: u32) -> Self {
        Self::new(amount, LookbackUnit::Year)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Lookback {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeframeError::InvalidLookback(s.to_string()))?;
        let (digits, suffix) = s.split_at(split);
        let amount: u32 = digits
            .parse()
            .map_err(|_| TimeframeError::InvalidLookback(s.to_string()))?;
        if amount == 0 {
            return Err(TimeframeError::InvalidLookback(s.to_string()));
        }
        let unit = match suffix {
            "d" => LookbackUnit::Day,
            "wk" => LookbackUnit::Week,
            "mo" => LookbackUnit::Month,
            "y" => LookbackUnit::Year,
            _ => return Err(TimeframeError::InvalidLookback(s.to_string())),
        };
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for Lookback {
    type Error = TimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.to_string()
    }
}
