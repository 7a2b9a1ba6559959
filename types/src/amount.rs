//! Asset amounts as they appear on the ledger (`"5.000 STEEM"`).
//!
//! Amounts are stored as fixed-point integers with three decimal places (the
//! ledger's precision for liquid assets) to avoid floating-point comparisons.
//! Digits beyond the third decimal are truncated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// Number of fractional digits kept by [`Amount`].
pub const PRECISION: u32 = 3;

const SCALE: u64 = 10u64.pow(PRECISION);

/// A non-negative quantity of a named asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Amount {
    milli: u64,
    asset: String,
}

impl Amount {
    /// Build an amount from thousandths of a unit.
    pub fn from_milli(milli: u64, asset: impl Into<String>) -> Self {
        Self {
            milli,
            asset: asset.into(),
        }
    }

    /// Thousandths of a unit.
    pub fn milli(&self) -> u64 {
        self.milli
    }

    /// The asset symbol, e.g. `STEEM`.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn is_zero(&self) -> bool {
        self.milli == 0
    }

    /// Whether both amounts are denominated in the same asset.
    pub fn same_asset(&self, other: &Amount) -> bool {
        self.asset == other.asset
    }
}

impl FromStr for Amount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(number), Some(asset), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseError::InvalidAmount(s.to_string()));
        };

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseError::InvalidAmount(s.to_string()));
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(ParseError::InvalidAmount(s.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ParseError::InvalidAmount(s.to_string()))?
        };
        let mut milli_part = 0u64;
        for (i, digit) in fraction.chars().take(PRECISION as usize).enumerate() {
            let d = u64::from(digit.to_digit(10).unwrap_or(0));
            milli_part += d * 10u64.pow(PRECISION - 1 - i as u32);
        }

        let milli = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(milli_part))
            .ok_or_else(|| ParseError::InvalidAmount(s.to_string()))?;

        Ok(Self {
            milli,
            asset: asset.to_string(),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:03} {}",
            self.milli / SCALE,
            self.milli % SCALE,
            self.asset
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
