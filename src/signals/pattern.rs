//! Candle-direction pattern matching over a trailing window.
//!
//! Each bar in the window is classified as bull (`close > open`) or bear
//! (everything else, dojis included). The resulting vector must equal one of
//! the catalog entries position by position: no partial credit, no rotation,
//! no wildcards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Bar;

pub const MIN_WINDOW: usize = 4;
pub const MAX_WINDOW: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern catalog is empty")]
    Empty,

    #[error("pattern window must be between 4 and 6 bars, got {0}")]
    Window(usize),

    #[error("catalog entry {index} has {len} bars, expected {expected}")]
    Ragged {
        index: usize,
        len: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOutcome {
    /// Bull/bear vector of the trailing window, `None` when too few bars.
    pub observed: Option<Vec<bool>>,
    pub matched: bool,
}

#[derive(Deserialize)]
struct RawCatalog {
    entries: Vec<Vec<bool>>,
    #[serde(default)]
    momentum: bool,
}

/// Accepted bull/bear sequences of one window length.
///
/// With `momentum` set, every bull bar after the first in the window must also
/// close above the previous bar's close. The check is off in every preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct PatternCatalog {
    entries: Vec<Vec<bool>>,
    momentum: bool,
}

impl TryFrom<RawCatalog> for PatternCatalog {
    type Error = PatternError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        Self::new(raw.entries, raw.momentum)
    }
}

impl PatternCatalog {
    pub fn new(entries: Vec<Vec<bool>>, momentum: bool) -> Result<Self, PatternError> {
        let expected = entries.first().ok_or(PatternError::Empty)?.len();
        if !(MIN_WINDOW..=MAX_WINDOW).contains(&expected) {
            return Err(PatternError::Window(expected));
        }
        if let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != expected)
        {
            return Err(PatternError::Ragged {
                index,
                len: entry.len(),
                expected,
            });
        }
        Ok(Self { entries, momentum })
    }

    /// One bear bar followed by three bull bars.
    pub fn pullback_four() -> Self {
        Self {
            entries: vec![vec![false, true, true, true]],
            momentum: false,
        }
    }

    /// Six-bar pressure shapes: a bearish dip resolved by a bull run.
    pub fn pressure_six() -> Self {
        Self {
            entries: vec![
                vec![true, false, false, true, true, true],
                vec![false, false, true, false, true, true],
                vec![false, false, true, true, true, true],
                vec![false, false, true, true, false, true],
                vec![false, false, false, true, true, true],
            ],
            momentum: false,
        }
    }

    pub fn with_momentum(mut self, momentum: bool) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn window(&self) -> usize {
        self.entries[0].len()
    }

    pub fn entries(&self) -> &[Vec<bool>] {
        &self.entries
    }

    pub fn momentum(&self) -> bool {
        self.momentum
    }

    /// Bull/bear classification of each bar.
    pub fn classify(bars: &[Bar]) -> Vec<bool> {
        bars.iter().map(Bar::is_bull).collect()
    }

    /// Exact positional match against any catalog entry.
    pub fn matches_vector(&self, observed: &[bool]) -> bool {
        self.entries.iter().any(|entry| entry.as_slice() == observed)
    }

    /// Classifies the trailing window of `bars` and matches it.
    pub fn evaluate(&self, bars: &[Bar]) -> PatternOutcome {
        let window = self.window();
        if bars.len() < window {
            return PatternOutcome {
                observed: None,
                matched: false,
            };
        }
        let tail = &bars[bars.len() - window..];
        let observed = Self::classify(tail);
        let matched =
            self.matches_vector(&observed) && (!self.momentum || Self::rising_bull_closes(tail));
        PatternOutcome {
            observed: Some(observed),
            matched,
        }
    }

    fn rising_bull_closes(window: &[Bar]) -> bool {
        window
            .windows(2)
            .all(|pair| !pair[1].is_bull() || pair[1].close > pair[0].close)
    }
}

/// Renders a bull/bear vector as `BULL BEAR ...` for logs.
pub fn describe(observed: &[bool]) -> String {
    observed
        .iter()
        .map(|&bull| if bull { "BULL" } else { "BEAR" })
        .collect::<Vec<_>>()
        .join(" ")
}
