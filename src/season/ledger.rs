//! Commitment ledger: once-only commitments and their results.

use super::Clock;
use crate::db::Repository;
use crate::domain::{
    CandidateId, Commitment, CommitmentId, CommitmentView, Decimal, EventId, FinishPosition,
    ScoredResult,
};
use crate::engine::payout;
use crate::error::LedgerError;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CommitmentLedger {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
}

impl CommitmentLedger {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Permanently commit a candidate to an event.
    pub async fn commit(
        &self,
        event_id: EventId,
        candidate_id: CandidateId,
    ) -> Result<Commitment, LedgerError> {
        let result = self
            .repo
            .commit_candidate(event_id, candidate_id, self.clock.today(), self.clock.now())
            .await;

        match &result {
            Ok(commitment) => info!(
                commitment_id = %commitment.id,
                event_id = %event_id,
                candidate = %commitment.candidate_name,
                "Candidate committed"
            ),
            Err(e) => warn!(event_id = %event_id, candidate_id = %candidate_id, error = %e, "Commit rejected"),
        }
        result
    }

    /// Score a commitment.
    ///
    /// Earnings come from the payout table unless the actually reported amount
    /// is supplied, which must be a non-negative whole amount.
    pub async fn record_result(
        &self,
        commitment_id: CommitmentId,
        finish_position: Option<FinishPosition>,
        reported_earnings: Option<Decimal>,
    ) -> Result<ScoredResult, LedgerError> {
        if finish_position == Some(0) {
            return Err(LedgerError::Validation(
                "finish position starts at 1".to_string(),
            ));
        }

        let view = self
            .repo
            .get_commitment_view(commitment_id)
            .await?
            .ok_or(LedgerError::CommitmentNotFound(commitment_id))?;

        let earnings = match reported_earnings {
            Some(reported) => {
                if reported.is_negative() || !reported.is_whole() {
                    return Err(LedgerError::Validation(format!(
                        "reported earnings must be a non-negative whole amount, got {}",
                        reported
                    )));
                }
                reported
            }
            None => payout::earnings(finish_position, view.purse, view.multiplier)?,
        };
        let units = earnings.to_units().ok_or_else(|| {
            LedgerError::Validation(format!("earnings {} out of range", earnings))
        })?;

        let scored = self
            .repo
            .apply_result(commitment_id, finish_position, units, self.clock.now())
            .await?;

        if scored.applied {
            info!(
                commitment_id = %commitment_id,
                segment = %view.segment,
                finish = ?finish_position,
                earnings = %scored.earnings,
                "Result recorded"
            );
        } else {
            info!(commitment_id = %commitment_id, "Result already recorded, nothing to apply");
        }
        Ok(scored)
    }

    /// Commitments with their events, by week.
    pub async fn list(&self) -> Result<Vec<CommitmentView>, LedgerError> {
        Ok(self.repo.list_commitment_views().await?)
    }

    pub async fn get(&self, id: CommitmentId) -> Result<Commitment, LedgerError> {
        self.repo
            .get_commitment(id)
            .await?
            .ok_or(LedgerError::CommitmentNotFound(id))
    }

    /// Earnings across every commitment of the season.
    pub async fn season_total(&self) -> Result<Decimal, LedgerError> {
        Ok(self.repo.sum_earnings().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_season;
    use super::*;
    use crate::config::StandingsMode;
    use crate::domain::CommitmentStatus;
    use crate::feed::EventRecord;
    use std::str::FromStr;

    async fn seed(season: &super::super::Season) -> CandidateId {
        let start_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        season
            .events
            .load(vec![EventRecord {
                id: EventId::new(7),
                name: "Farmers Insurance Open".to_string(),
                start_date,
                end_date: start_date + chrono::Duration::days(3),
                purse: Decimal::from_units(4_500_000),
                multiplier: Decimal::from_str("2").unwrap(),
                segment: "Q1".to_string(),
                event_type: "regular".to_string(),
                is_completed: false,
            }])
            .await
            .unwrap();
        season
            .candidates
            .upsert("Hideki Matsuyama", Some(7), None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_record_result_uses_payout_table() {
        let (season, _clock, _repo, _temp) = setup_season("2025-01-01", StandingsMode::Live).await;
        let golfer = seed(&season).await;
        let commitment = season.ledger.commit(EventId::new(7), golfer).await.unwrap();

        // Effective purse 9M, third place 6.9%.
        let scored = season
            .ledger
            .record_result(commitment.id, Some(3), None)
            .await
            .unwrap();
        assert!(scored.applied);
        assert_eq!(scored.earnings, Decimal::from_units(621_000));

        let stored = season.ledger.get(commitment.id).await.unwrap();
        assert_eq!(stored.status, CommitmentStatus::Scored);
        assert_eq!(season.ledger.season_total().await.unwrap(), Decimal::from_units(621_000));
    }

    #[tokio::test]
    async fn test_reported_earnings_override_payout() {
        let (season, _clock, _repo, _temp) = setup_season("2025-01-01", StandingsMode::Live).await;
        let golfer = seed(&season).await;
        let commitment = season.ledger.commit(EventId::new(7), golfer).await.unwrap();

        let scored = season
            .ledger
            .record_result(commitment.id, Some(3), Some(Decimal::from_units(615_250)))
            .await
            .unwrap();
        assert_eq!(scored.earnings, Decimal::from_units(615_250));
    }

    #[tokio::test]
    async fn test_reported_earnings_validation() {
        let (season, _clock, _repo, _temp) = setup_season("2025-01-01", StandingsMode::Live).await;
        let golfer = seed(&season).await;
        let commitment = season.ledger.commit(EventId::new(7), golfer).await.unwrap();

        for bad in ["-1", "100.5"] {
            let err = season
                .ledger
                .record_result(commitment.id, Some(3), Some(Decimal::from_str(bad).unwrap()))
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{}", bad);
        }
        assert!(matches!(
            season.ledger.record_result(commitment.id, Some(0), None).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(!season.ledger.get(commitment.id).await.unwrap().is_scored());
    }

    #[tokio::test]
    async fn test_missed_cut_scores_zero() {
        let (season, _clock, _repo, _temp) = setup_season("2025-01-01", StandingsMode::Live).await;
        let golfer = seed(&season).await;
        let commitment = season.ledger.commit(EventId::new(7), golfer).await.unwrap();

        let scored = season
            .ledger
            .record_result(commitment.id, None, None)
            .await
            .unwrap();
        assert_eq!(scored.earnings, Decimal::zero());
        assert!(season.ledger.get(commitment.id).await.unwrap().is_scored());
    }

    #[tokio::test]
    async fn test_unknown_commitment() {
        let (season, _clock, _repo, _temp) = setup_season("2025-01-01", StandingsMode::Live).await;
        assert!(matches!(
            season.ledger.record_result(CommitmentId::new(4), Some(1), None).await,
            Err(LedgerError::CommitmentNotFound(_))
        ));
        assert!(matches!(
            season.ledger.get(CommitmentId::new(4)).await,
            Err(LedgerError::CommitmentNotFound(_))
        ));
    }
}
