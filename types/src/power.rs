//! Vote weights and voting power, both in hundredths of a percent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// 100 % expressed in hundredths of a percent.
pub const FULL: u16 = 10_000;

/// Parse `"80.0 %"`, `"80%"` or `"80"` into hundredths of a percent.
fn parse_basis_points(s: &str) -> Result<u16, ParseError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value: f64 = number
        .parse()
        .map_err(|_| ParseError::InvalidPercent(s.to_string()))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ParseError::PercentOutOfRange(s.to_string()));
    }
    Ok((value * 100.0).round() as u16)
}

/// Vote strength (`0..=10000`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteWeight(u16);

impl VoteWeight {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(FULL);

    /// Create a weight, clamping to 100 %.
    pub fn new(hundredths: u16) -> Self {
        Self(hundredths.min(FULL))
    }

    pub fn hundredths(&self) -> u16 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_full(&self) -> bool {
        self.0 >= FULL
    }
}

impl FromStr for VoteWeight {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_basis_points(s).map(Self)
    }
}

impl fmt::Display for VoteWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} %", f64::from(self.0) / 100.0)
    }
}

/// Remaining voting power of an account (`0..=10000`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VotingPower(u16);

impl VotingPower {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(FULL);

    /// Create a power value, clamping to 100 %.
    pub fn new(hundredths: u16) -> Self {
        Self(hundredths.min(FULL))
    }

    pub fn hundredths(&self) -> u16 {
        self.0
    }

    /// Power as a percentage (`0.0..=100.0`).
    pub fn percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Lower this threshold by `reserve`, saturating at zero.
    pub fn saturating_sub(self, reserve: VotingPower) -> Self {
        Self(self.0.saturating_sub(reserve.0))
    }
}

impl FromStr for VotingPower {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_basis_points(s).map(Self)
    }
}

impl fmt::Display for VotingPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} %", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_forms() {
        assert_eq!("100.0 %".parse::<VoteWeight>().unwrap(), VoteWeight::FULL);
        assert_eq!("80%".parse::<VotingPower>().unwrap().hundredths(), 8000);
        assert_eq!("12.34".parse::<VotingPower>().unwrap().hundredths(), 1234);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(matches!(
            "150 %".parse::<VoteWeight>(),
            Err(ParseError::PercentOutOfRange(_))
        ));
        assert!(matches!(
            "lots".parse::<VoteWeight>(),
            Err(ParseError::InvalidPercent(_))
        ));
    }

    #[test]
    fn constructors_clamp() {
        assert_eq!(VoteWeight::new(20_000), VoteWeight::FULL);
        assert_eq!(VotingPower::new(10_001), VotingPower::FULL);
    }

    #[test]
    fn display() {
        assert_eq!(VotingPower::new(9_512).to_string(), "95.120 %");
        assert_eq!(VoteWeight::new(5_000).to_string(), "50.00 %");
    }
}
