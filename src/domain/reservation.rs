//! Non-binding plans to use a candidate in a future week.

use crate::domain::{CandidateId, Decimal, EventId, Tier, TimeMs, Week};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub candidate_id: CandidateId,
    pub week: Week,
    pub updated_at: TimeMs,
}

/// Reservation joined with the candidate and the event at its week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub candidate_name: String,
    pub tier: Tier,
    pub event_id: EventId,
    pub event_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purse: Decimal,
    pub multiplier: Decimal,
    pub segment: String,
    /// Planning estimate for this pairing; never a payout.
    pub expected_value: Decimal,
}
