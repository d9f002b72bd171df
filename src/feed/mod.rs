//! Season feed abstraction for loading the schedule and the candidate field.
//!
//! Fetching from third-party providers happens elsewhere; a feed hands the
//! engine records that have already been retrieved.

use crate::domain::{Decimal, EventId, Tier};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

pub mod csv_file;
pub mod mock;

pub use csv_file::CsvSeasonFeed;
pub use mock::MockSeasonFeed;

/// An event as delivered by a feed. Weeks are assigned on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purse: Decimal,
    pub multiplier: Decimal,
    pub segment: String,
    pub event_type: String,
    pub is_completed: bool,
}

/// A candidate as delivered by a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub name: String,
    pub rank: Option<u32>,
    /// Falls back to the rank band when absent.
    pub tier: Option<Tier>,
}

impl CandidateRecord {
    pub fn resolved_tier(&self) -> Tier {
        self.tier
            .or_else(|| self.rank.map(Tier::from_rank))
            .unwrap_or(Tier::Longshot)
    }
}

/// Source of season setup data.
#[async_trait]
pub trait SeasonFeed: Send + Sync + fmt::Debug {
    /// All events of the season, in any order.
    async fn fetch_events(&self) -> Result<Vec<EventRecord>, FeedError>;

    /// The candidate field with current rankings.
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FeedError>;
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv parse error: {0}")]
    Csv(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
