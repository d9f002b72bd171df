//! Binding, once-only assignments of a candidate to an event.

use crate::domain::{CandidateId, CommitmentId, Decimal, EventId, FinishPosition, TimeMs, Week};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a commitment's outcome has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Pending,
    Scored,
}

impl CommitmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentStatus::Pending => "pending",
            CommitmentStatus::Scored => "scored",
        }
    }
}

impl fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommitmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommitmentStatus::Pending),
            "scored" => Ok(CommitmentStatus::Scored),
            other => Err(format!("unknown commitment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub id: CommitmentId,
    pub event_id: EventId,
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    /// `None` while pending, and after scoring for a missed cut or withdrawal.
    pub finish_position: Option<FinishPosition>,
    pub earnings: Decimal,
    pub status: CommitmentStatus,
    pub created_at: TimeMs,
    pub scored_at: Option<TimeMs>,
}

impl Commitment {
    pub fn is_scored(&self) -> bool {
        self.status == CommitmentStatus::Scored
    }
}

/// Commitment joined with the event it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentView {
    #[serde(flatten)]
    pub commitment: Commitment,
    pub week: Week,
    pub event_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purse: Decimal,
    pub multiplier: Decimal,
    pub segment: String,
}

/// A recorded result, as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub commitment_id: CommitmentId,
    pub finish_position: Option<FinishPosition>,
    pub earnings: Decimal,
    /// False when an identical result had already been recorded.
    pub applied: bool,
}
