pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod feed;
pub mod season;

pub use config::{Config, StandingsMode};
pub use db::{init_db, Repository};
pub use domain::{
    Candidate, CandidateId, Commitment, CommitmentId, Decimal, Event, EventId, Reservation,
    SegmentStanding, Tier, TimeMs,
};
pub use error::{AppError, LedgerError};
pub use feed::{CsvSeasonFeed, MockSeasonFeed, SeasonFeed};
pub use season::{Clock, FixedClock, Season, SystemClock};
