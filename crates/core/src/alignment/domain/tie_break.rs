use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transcript::domain::transcript::Turn;

/// Decides between two turns that overlap a segment by the same amount.
pub trait TieBreak: Send + Sync {
    /// Returns true when `challenger` should replace the current `incumbent`.
    ///
    /// The incumbent was encountered earlier in input order.
    fn prefer(&self, challenger: &Turn, incumbent: &Turn) -> bool;
}

/// Keeps the first turn in input order.
pub struct FirstEncountered;

impl TieBreak for FirstEncountered {
    fn prefer(&self, _challenger: &Turn, _incumbent: &Turn) -> bool {
        false
    }
}

/// Prefers the shorter turn; equal durations keep the earlier one.
pub struct ShortestTurn;

impl TieBreak for ShortestTurn {
    fn prefer(&self, challenger: &Turn, incumbent: &Turn) -> bool {
        challenger.duration() < incumbent.duration()
    }
}

/// Prefers the turn that starts first; equal starts keep the earlier one.
pub struct EarliestStart;

impl TieBreak for EarliestStart {
    fn prefer(&self, challenger: &Turn, incumbent: &Turn) -> bool {
        challenger.start < incumbent.start
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreakPolicy {
    #[default]
    First,
    Shortest,
    Earliest,
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreakPolicy::First => write!(f, "first"),
            TieBreakPolicy::Shortest => write!(f, "shortest"),
            TieBreakPolicy::Earliest => write!(f, "earliest"),
        }
    }
}

impl FromStr for TieBreakPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(TieBreakPolicy::First),
            "shortest" => Ok(TieBreakPolicy::Shortest),
            "earliest" => Ok(TieBreakPolicy::Earliest),
            other => Err(format!(
                "tie-break must be one of: first, shortest, earliest, got '{other}'"
            )),
        }
    }
}

pub fn create_tie_break(policy: TieBreakPolicy) -> Box<dyn TieBreak> {
    match policy {
        TieBreakPolicy::First => Box::new(FirstEncountered),
        TieBreakPolicy::Shortest => Box::new(ShortestTurn),
        TieBreakPolicy::Earliest => Box::new(EarliestStart),
    }
}
