//! Reservation planner: tentative, freely revisable week assignments.

use super::Clock;
use crate::db::Repository;
use crate::domain::{Candidate, CandidateId, Decimal, Reservation, ReservationView, Week};
use crate::engine::expected_value;
use crate::error::LedgerError;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// A candidate ranked for a week by expected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub expected_value: Decimal,
    /// Week this candidate is currently reserved for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_week: Option<Week>,
}

#[derive(Clone)]
pub struct ReservationPlanner {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
}

impl ReservationPlanner {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Reserve a candidate for a week, moving it from any other week and
    /// evicting whoever held this one.
    pub async fn upsert(
        &self,
        candidate_id: CandidateId,
        week: Week,
    ) -> Result<Reservation, LedgerError> {
        let reservation = self
            .repo
            .upsert_reservation(candidate_id, week, self.clock.today(), self.clock.now())
            .await?;
        info!(candidate_id = %candidate_id, week, "Reservation saved");
        Ok(reservation)
    }

    /// Remove the reservation selected by exactly one of candidate or week.
    pub async fn clear(
        &self,
        candidate_id: Option<CandidateId>,
        week: Option<Week>,
    ) -> Result<u64, LedgerError> {
        let removed = match (candidate_id, week) {
            (Some(candidate_id), None) => {
                self.repo.delete_reservation_for_candidate(candidate_id).await?
            }
            (None, Some(week)) => self.repo.delete_reservation_for_week(week).await?,
            _ => {
                return Err(LedgerError::Validation(
                    "exactly one of candidateId or week is required".to_string(),
                ))
            }
        };
        info!(?candidate_id, ?week, removed, "Reservation cleared");
        Ok(removed)
    }

    /// Reservations by week, with the candidate's expected value at that event.
    pub async fn list(&self) -> Result<Vec<ReservationView>, LedgerError> {
        let rows = self.repo.list_reservation_rows().await?;
        rows.into_iter()
            .map(|row| -> Result<ReservationView, LedgerError> {
                let expected_value =
                    expected_value(row.candidate.tier, row.event.purse, row.event.multiplier)?;
                Ok(ReservationView {
                    reservation: row.reservation,
                    candidate_name: row.candidate.name,
                    tier: row.candidate.tier,
                    event_id: row.event.id,
                    event_name: row.event.name,
                    start_date: row.event.start_date,
                    end_date: row.event.end_date,
                    purse: row.event.purse,
                    multiplier: row.event.multiplier,
                    segment: row.event.segment,
                    expected_value,
                })
            })
            .collect()
    }

    /// Available candidates for the event at `week`, best expected value first.
    ///
    /// Ties fall back to rank (unranked last) and then name.
    pub async fn recommend(
        &self,
        week: Week,
        limit: usize,
    ) -> Result<Vec<Recommendation>, LedgerError> {
        let event = self
            .repo
            .get_event_by_week(week)
            .await?
            .ok_or(LedgerError::WeekNotFound(week))?;
        if event.is_complete_on(self.clock.today()) {
            return Err(LedgerError::EventCompleted(event.id));
        }

        let reserved: Vec<(CandidateId, Week)> = self
            .repo
            .list_reservation_rows()
            .await?
            .into_iter()
            .map(|row| (row.reservation.candidate_id, row.reservation.week))
            .collect();

        let mut ranked: Vec<Recommendation> = self
            .repo
            .list_available_candidates()
            .await?
            .into_iter()
            .map(|candidate| -> Result<Recommendation, LedgerError> {
                Ok(Recommendation {
                    expected_value: expected_value(candidate.tier, event.purse, event.multiplier)?,
                    reserved_week: reserved
                        .iter()
                        .find(|(id, _)| *id == candidate.id)
                        .map(|(_, w)| *w),
                    candidate,
                })
            })
            .collect::<Result<_, _>>()?;

        ranked.sort_by(|a, b| {
            b.expected_value
                .cmp(&a.expected_value)
                .then_with(|| rank_key(&a.candidate).cmp(&rank_key(&b.candidate)))
                .then_with(|| a.candidate.name.cmp(&b.candidate.name))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

fn rank_key(candidate: &Candidate) -> (bool, u32) {
    (candidate.rank.is_none(), candidate.rank.unwrap_or(u32::MAX))
}
