//! Color domain types
//!
//! The fixed color set served by `/api/color` and the tally reported by
//! `/api/stats`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// A color the service can pick and store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
}

impl Color {
    /// Every color, in declaration order
    pub const ALL: [Color; 3] = [Color::Red, Color::Blue, Color::Green];

    /// Pick a color uniformly at random
    pub fn random() -> Self {
        let idx = rand::thread_rng().gen_range(0..Self::ALL.len());
        Self::ALL[idx]
    }

    /// Wire representation stored in Redis and returned in JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
        }
    }

    /// Parse a stored value. Only the exact lowercase names match.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "red" => Some(Color::Red),
            "blue" => Some(Color::Blue),
            "green" => Some(Color::Green),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a string is not one of the known colors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown color: {0}")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s).ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// Per-color counts over every stored value
///
/// `total` counts every stored value. Values that are not a known color
/// are skipped by the per-color counters, so `red + blue + green` can be
/// less than `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTally {
    pub total: u64,
    pub red: u64,
    pub blue: u64,
    pub green: u64,
}

impl ColorTally {
    /// Count one stored value. Returns `false` if it is not a known color.
    pub fn record(&mut self, value: &str) -> bool {
        self.total += 1;
        let Some(color) = Color::parse(value) else {
            return false;
        };
        match color {
            Color::Red => self.red += 1,
            Color::Blue => self.blue += 1,
            Color::Green => self.green += 1,
        }
        true
    }

    /// Tally an iterator of stored values
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for value in values {
            let value = value.as_ref();
            if !tally.record(value) {
                debug!(value = %value, "Stored value is not a known color");
            }
        }
        tally
    }

    /// Count for a single color
    pub fn count(&self, color: Color) -> u64 {
        match color {
            Color::Red => self.red,
            Color::Blue => self.blue,
            Color::Green => self.green,
        }
    }
}
