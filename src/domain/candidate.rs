//! Candidates (golfers) and their skill tiers.

use crate::domain::{CandidateId, EventId, Week};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse skill band derived from world ranking, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Elite,
    Contender,
    Solid,
    Longshot,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Elite, Tier::Contender, Tier::Solid, Tier::Longshot];

    /// Band a world ranking: top 10, top 30, top 75, everyone else.
    pub fn from_rank(rank: u32) -> Tier {
        match rank {
            0..=10 => Tier::Elite,
            11..=30 => Tier::Contender,
            31..=75 => Tier::Solid,
            _ => Tier::Longshot,
        }
    }

    /// Ordinal as stored (1 = best).
    pub fn ordinal(&self) -> i64 {
        match self {
            Tier::Elite => 1,
            Tier::Contender => 2,
            Tier::Solid => 3,
            Tier::Longshot => 4,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Tier> {
        match ordinal {
            1 => Some(Tier::Elite),
            2 => Some(Tier::Contender),
            3 => Some(Tier::Solid),
            4 => Some(Tier::Longshot),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Elite => "elite",
            Tier::Contender => "contender",
            Tier::Solid => "solid",
            Tier::Longshot => "longshot",
        };
        write!(f, "{}", s)
    }
}

/// Accepts either the ordinal ("1".."4") or the band name.
impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Tier::from_ordinal(ordinal).ok_or_else(|| format!("unknown tier: {}", s));
        }
        match s.as_str() {
            "elite" => Ok(Tier::Elite),
            "contender" => Ok(Tier::Contender),
            "solid" => Ok(Tier::Solid),
            "longshot" => Ok(Tier::Longshot),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// A golfer that can be used once per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub rank: Option<u32>,
    pub tier: Tier,
    pub committed_event_id: Option<EventId>,
    pub committed_week: Option<Week>,
}

impl Candidate {
    pub fn is_committed(&self) -> bool {
        self.committed_event_id.is_some()
    }
}
