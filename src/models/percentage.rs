//! Percentage type with two-decimal precision
//!
//! Stored as hundredths of a percent (i64) so that percentage arithmetic
//! stays exact, mirroring how Money stores cents. A percentage is derived
//! from an amount/total pair by half-up rounding to two decimal places.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use super::money::Money;

/// A percentage with two decimal places, stored as hundredths of a percent
///
/// `Percentage::from_hundredths(6000)` is 60.00%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(i64);

impl Percentage {
    /// 100.00%
    pub const HUNDRED: Percentage = Percentage(10_000);

    /// Create from hundredths of a percent (6000 = 60.00%)
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Create a zero percentage
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the value in hundredths of a percent
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Absolute difference between two percentages
    pub const fn abs_diff(&self, other: Self) -> Self {
        Self((self.0 - other.0).abs())
    }

    /// Derive the percentage share of `amount` within `total`, rounded
    /// half-up to two decimal places.
    ///
    /// A zero total yields zero rather than dividing by it.
    pub fn of_amount(amount: Money, total: Money) -> Self {
        if total.is_zero() {
            return Self::zero();
        }
        // round(amount / total * 100) at 2 dp, computed in integer space:
        // floor((2 * amount * 10_000 + total) / (2 * total))
        let n = amount.cents() as i128 * 10_000;
        let d = total.cents() as i128;
        let rounded = (2 * n + d) / (2 * d);
        Self(rounded as i64)
    }

    /// Parse a percentage from a string
    ///
    /// Accepts formats: "60", "60.5", "60.00", "60.00%"
    pub fn parse(s: &str) -> Result<Self, PercentageParseError> {
        let s = s.trim();
        let s = s.strip_suffix('%').unwrap_or(s).trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let hundredths = if s.contains('.') {
            let parts: Vec<&str> = s.split('.').collect();
            if parts.len() != 2 {
                return Err(PercentageParseError::InvalidFormat(s.to_string()));
            }

            let whole: i64 = parts[0]
                .parse()
                .map_err(|_| PercentageParseError::InvalidFormat(s.to_string()))?;

            let frac_str = parts[1];
            let frac: i64 = match frac_str.len() {
                0 => 0,
                1 => {
                    frac_str
                        .parse::<i64>()
                        .map_err(|_| PercentageParseError::InvalidFormat(s.to_string()))?
                        * 10
                }
                _ => frac_str[..2]
                    .parse()
                    .map_err(|_| PercentageParseError::InvalidFormat(s.to_string()))?,
            };

            whole * 100 + frac
        } else {
            s.parse::<i64>()
                .map_err(|_| PercentageParseError::InvalidFormat(s.to_string()))?
                * 100
        };

        Ok(Self(if negative { -hundredths } else { hundredths }))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = (self.0 % 100).abs();
        if self.0 < 0 && whole == 0 {
            write!(f, "-0.{:02}%", frac)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

impl FromStr for Percentage {
    type Err = PercentageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Percentage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Percentage {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl std::iter::Sum for Percentage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Percentage::zero(), |acc, p| acc + p)
    }
}

/// Error type for percentage parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PercentageParseError {
    InvalidFormat(String),
}

impl fmt::Display for PercentageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentageParseError::InvalidFormat(s) => {
                write!(f, "Invalid percentage format: {}", s)
            }
        }
    }
}

impl std::error::Error for PercentageParseError {}
