//! Candidate registry.

use crate::db::Repository;
use crate::domain::{Candidate, CandidateId, Tier};
use crate::error::LedgerError;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct CandidateRegistry {
    repo: Arc<Repository>,
}

impl CandidateRegistry {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Skill band for a world ranking.
    pub fn tier_of(rank: u32) -> Tier {
        Tier::from_rank(rank)
    }

    pub async fn list(&self) -> Result<Vec<Candidate>, LedgerError> {
        Ok(self.repo.list_candidates().await?)
    }

    /// Candidates never committed this season.
    pub async fn available(&self) -> Result<Vec<Candidate>, LedgerError> {
        Ok(self.repo.list_available_candidates().await?)
    }

    pub async fn get(&self, id: CandidateId) -> Result<Candidate, LedgerError> {
        self.repo
            .get_candidate(id)
            .await?
            .ok_or(LedgerError::CandidateNotFound(id))
    }

    pub async fn by_name(&self, name: &str) -> Result<Option<Candidate>, LedgerError> {
        Ok(self.repo.get_candidate_by_name(name.trim()).await?)
    }

    /// Register a candidate or refresh its ranking.
    ///
    /// Without an explicit tier the rank band is used; unranked candidates are longshots.
    pub async fn upsert(
        &self,
        name: &str,
        rank: Option<u32>,
        tier: Option<Tier>,
    ) -> Result<Candidate, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation(
                "candidate name must not be empty".to_string(),
            ));
        }
        let tier = tier
            .or_else(|| rank.map(Self::tier_of))
            .unwrap_or(Tier::Longshot);

        let candidate = self.repo.upsert_candidate(name, rank, tier).await?;
        debug!(candidate_id = %candidate.id, name, %tier, "Candidate upserted");
        Ok(candidate)
    }
}
