//! Season services: registries, planner, ledger and standings over one
//! repository and one clock.

pub mod candidates;
pub mod events;
pub mod ledger;
pub mod planner;
pub mod standings;

pub use candidates::CandidateRegistry;
pub use events::EventRegistry;
pub use ledger::CommitmentLedger;
pub use planner::{Recommendation, ReservationPlanner};
pub use standings::StandingsAggregator;

use crate::config::StandingsMode;
use crate::db::Repository;
use crate::domain::{
    CandidateId, Candidate, Commitment, CommitmentId, CommitmentView, Decimal, Event, EventId,
    FinishPosition, Reservation, ReservationView, ScoredResult, SegmentStanding, Tier, TimeMs,
    Week,
};
use crate::engine;
use crate::error::LedgerError;
use crate::feed::{FeedError, SeasonFeed};
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

/// Source of "today" and "now" for date-driven rules.
pub trait Clock: Send + Sync + fmt::Debug {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> TimeMs;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> TimeMs {
        TimeMs::now()
    }
}

/// Clock pinned to a date, movable by tests.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        if let Ok(mut guard) = self.today.write() {
            *guard = today;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn now(&self) -> TimeMs {
        let millis = self
            .today()
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        TimeMs::new(millis)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub events_fetched: usize,
    pub events_new: usize,
    pub candidates_upserted: usize,
}

/// The engine's entry point. Every component shares the same repository and clock.
#[derive(Clone)]
pub struct Season {
    pub events: EventRegistry,
    pub candidates: CandidateRegistry,
    pub planner: ReservationPlanner,
    pub ledger: CommitmentLedger,
    pub standings: StandingsAggregator,
}

impl Season {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>, mode: StandingsMode) -> Self {
        Self {
            events: EventRegistry::new(repo.clone(), clock.clone()),
            candidates: CandidateRegistry::new(repo.clone()),
            planner: ReservationPlanner::new(repo.clone(), clock.clone()),
            ledger: CommitmentLedger::new(repo.clone(), clock),
            standings: StandingsAggregator::new(repo, mode),
        }
    }

    pub async fn current_event(&self) -> Result<Event, LedgerError> {
        self.events.current().await
    }

    pub async fn schedule(&self) -> Result<Vec<Event>, LedgerError> {
        self.events.schedule().await
    }

    pub async fn complete_event(
        &self,
        event_id: EventId,
        winner: Option<&str>,
    ) -> Result<Event, LedgerError> {
        self.events.complete(event_id, winner).await
    }

    pub async fn list_candidates(&self) -> Result<Vec<Candidate>, LedgerError> {
        self.candidates.list().await
    }

    pub async fn create_reservation(
        &self,
        candidate_id: CandidateId,
        week: Week,
    ) -> Result<Reservation, LedgerError> {
        self.planner.upsert(candidate_id, week).await
    }

    pub async fn clear_reservation(
        &self,
        candidate_id: Option<CandidateId>,
        week: Option<Week>,
    ) -> Result<u64, LedgerError> {
        self.planner.clear(candidate_id, week).await
    }

    pub async fn list_reservations(&self) -> Result<Vec<ReservationView>, LedgerError> {
        self.planner.list().await
    }

    pub async fn recommend(
        &self,
        week: Week,
        limit: usize,
    ) -> Result<Vec<Recommendation>, LedgerError> {
        self.planner.recommend(week, limit).await
    }

    pub async fn commit(
        &self,
        event_id: EventId,
        candidate_id: CandidateId,
    ) -> Result<Commitment, LedgerError> {
        self.ledger.commit(event_id, candidate_id).await
    }

    pub async fn record_result(
        &self,
        commitment_id: CommitmentId,
        finish_position: Option<FinishPosition>,
        reported_earnings: Option<Decimal>,
    ) -> Result<ScoredResult, LedgerError> {
        self.ledger
            .record_result(commitment_id, finish_position, reported_earnings)
            .await
    }

    pub async fn list_commitments(&self) -> Result<Vec<CommitmentView>, LedgerError> {
        self.ledger.list().await
    }

    pub async fn list_segment_standings(&self) -> Result<Vec<SegmentStanding>, LedgerError> {
        self.standings.list().await
    }

    pub fn compute_ev(
        &self,
        tier: Tier,
        purse: Decimal,
        multiplier: Decimal,
    ) -> Result<Decimal, LedgerError> {
        Ok(engine::expected_value(tier, purse, multiplier)?)
    }

    /// Load the schedule and candidate field from a feed.
    ///
    /// Existing events are left as they are; candidates get their ranking refreshed.
    pub async fn sync(&self, feed: &dyn SeasonFeed) -> Result<SyncReport, SyncError> {
        let events = feed.fetch_events().await?;
        let candidates = feed.fetch_candidates().await?;

        let events_fetched = events.len();
        let events_new = self.events.load(events).await?;

        let mut candidates_upserted = 0usize;
        for record in &candidates {
            self.candidates
                .upsert(&record.name, record.rank, record.tier)
                .await?;
            candidates_upserted += 1;
        }

        info!(events_fetched, events_new, candidates_upserted, "Season feed synced");

        Ok(SyncReport {
            events_fetched,
            events_new,
            candidates_upserted,
        })
    }
}
