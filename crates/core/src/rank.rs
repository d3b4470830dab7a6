//! Permission tiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Permission tier of a connection, ordered from least to most trusted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Rank {
    /// May not edit anything.
    Banned = -20,
    /// Lowest editing tier; subject to reach-distance checks.
    #[default]
    Guest = 0,
    Builder = 30,
    AdvBuilder = 50,
    Operator = 80,
    Admin = 100,
    /// Nobody holds this rank; used to lock blocks entirely.
    Nobody = 120,
}

impl Rank {
    /// Numeric permission level.
    pub const fn level(self) -> i16 {
        self as i16
    }

    pub const fn name(self) -> &'static str {
        match self {
            Rank::Banned => "banned",
            Rank::Guest => "guest",
            Rank::Builder => "builder",
            Rank::AdvBuilder => "advbuilder",
            Rank::Operator => "operator",
            Rank::Admin => "admin",
            Rank::Nobody => "nobody",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a rank name is not recognized.
#[derive(Debug, Error)]
#[error("unknown rank: {0}")]
pub struct ParseRankError(pub String);

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "banned" => Ok(Rank::Banned),
            "guest" => Ok(Rank::Guest),
            "builder" => Ok(Rank::Builder),
            "advbuilder" => Ok(Rank::AdvBuilder),
            "operator" | "op" => Ok(Rank::Operator),
            "admin" => Ok(Rank::Admin),
            "nobody" => Ok(Rank::Nobody),
            _ => Err(ParseRankError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_order_by_level() {
        assert!(Rank::Banned < Rank::Guest);
        assert!(Rank::Guest < Rank::Operator);
        assert!(Rank::Admin < Rank::Nobody);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Op".parse::<Rank>().unwrap(), Rank::Operator);
        assert!("wizard".parse::<Rank>().is_err());
    }
}
