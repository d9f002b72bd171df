//! Segment standings, served live or from the incremental table.

use crate::config::StandingsMode;
use crate::db::Repository;
use crate::domain::SegmentStanding;
use crate::engine::aggregate;
use crate::error::LedgerError;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct StandingsAggregator {
    repo: Arc<Repository>,
    mode: StandingsMode,
}

impl StandingsAggregator {
    pub fn new(repo: Arc<Repository>, mode: StandingsMode) -> Self {
        Self { repo, mode }
    }

    pub fn mode(&self) -> StandingsMode {
        self.mode
    }

    /// Standings from the configured source.
    pub async fn list(&self) -> Result<Vec<SegmentStanding>, LedgerError> {
        match self.mode {
            StandingsMode::Live => self.live().await,
            StandingsMode::Incremental => self.incremental().await,
        }
    }

    /// Fold every scored commitment now.
    pub async fn live(&self) -> Result<Vec<SegmentStanding>, LedgerError> {
        let entries = self.repo.query_scored_entries().await?;
        Ok(aggregate(entries))
    }

    /// The table maintained as results are recorded.
    pub async fn incremental(&self) -> Result<Vec<SegmentStanding>, LedgerError> {
        Ok(self.repo.list_segment_standings().await?)
    }

    /// Overwrite the incremental table with the live fold.
    pub async fn rebuild(&self) -> Result<Vec<SegmentStanding>, LedgerError> {
        let standings = self.live().await?;
        self.repo.replace_segment_standings(&standings).await?;
        info!(segments = standings.len(), "Segment standings rebuilt");
        Ok(standings)
    }
}
