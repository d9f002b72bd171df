//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by entity:
//! - `events.rs` - Schedule and completion
//! - `candidates.rs` - Candidate registry and the commitment marker
//! - `reservations.rs` - Reservation planner writes
//! - `commitments.rs` - Commit and result transitions
//! - `standings.rs` - Incremental segment standings

mod candidates;
mod commitments;
mod events;
mod reservations;
mod standings;

use crate::domain::{
    Candidate, CandidateId, Commitment, CommitmentId, CommitmentStatus, Decimal, Event, EventId,
    Reservation, Tier, TimeMs,
};
use chrono::NaiveDate;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Row, Transaction};
use std::str::FromStr;
use tracing::warn;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Event columns, aliased with an `e_` prefix for use in joins.
pub(crate) const EVENT_COLUMNS: &str = "e.id AS e_id, e.week AS e_week, e.name AS e_name, \
     e.start_date AS e_start_date, e.end_date AS e_end_date, e.purse AS e_purse, \
     e.multiplier AS e_multiplier, e.segment AS e_segment, e.event_type AS e_event_type, \
     e.is_completed AS e_is_completed, e.winner AS e_winner";

/// Candidate columns, aliased with a `c_` prefix for use in joins.
pub(crate) const CANDIDATE_COLUMNS: &str = "c.id AS c_id, c.name AS c_name, \
     c.world_rank AS c_world_rank, c.tier AS c_tier, \
     c.committed_event_id AS c_committed_event_id, c.committed_week AS c_committed_week";

/// Commitment columns, aliased with an `m_` prefix for use in joins.
pub(crate) const COMMITMENT_COLUMNS: &str = "m.id AS m_id, m.event_id AS m_event_id, \
     m.candidate_id AS m_candidate_id, m.candidate_name AS m_candidate_name, \
     m.finish_position AS m_finish_position, m.earnings AS m_earnings, m.status AS m_status, \
     m.created_at AS m_created_at, m.scored_at AS m_scored_at";

/// Reservation joined with its candidate and the event at its week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRow {
    pub reservation: Reservation,
    pub candidate: Candidate,
    pub event: Event,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a transaction that already holds the database write lock.
    ///
    /// Concurrent writers wait here on `busy_timeout`, so reads made inside
    /// the transaction see everything a writer ahead of them committed.
    pub(crate) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        // Any write statement takes the lock, even one that matches no rows.
        sqlx::query("UPDATE events SET week = week WHERE 0")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

fn decode_error(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| decode_error(format!("invalid date {:?}: {}", s, e)))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_decimal_or_default(field: &str, value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        warn!(field, value, error = %e, "Failed to parse stored decimal, using default");
        Decimal::default()
    })
}

pub(crate) fn parse_event(row: &SqliteRow) -> Result<Event, sqlx::Error> {
    let start_date: String = row.get("e_start_date");
    let end_date: String = row.get("e_end_date");
    let purse: String = row.get("e_purse");
    let multiplier: String = row.get("e_multiplier");

    Ok(Event {
        id: EventId::new(row.get("e_id")),
        week: row.get::<i64, _>("e_week") as u32,
        name: row.get("e_name"),
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        purse: parse_decimal_or_default("purse", &purse),
        multiplier: parse_decimal_or_default("multiplier", &multiplier),
        segment: row.get("e_segment"),
        event_type: row.get("e_event_type"),
        is_completed: row.get::<i64, _>("e_is_completed") != 0,
        winner: row.get("e_winner"),
    })
}

pub(crate) fn parse_candidate(row: &SqliteRow) -> Result<Candidate, sqlx::Error> {
    let tier_ordinal: i64 = row.get("c_tier");
    let tier = Tier::from_ordinal(tier_ordinal)
        .ok_or_else(|| decode_error(format!("invalid tier ordinal {}", tier_ordinal)))?;

    Ok(Candidate {
        id: CandidateId::new(row.get("c_id")),
        name: row.get("c_name"),
        rank: row.get::<Option<i64>, _>("c_world_rank").map(|r| r as u32),
        tier,
        committed_event_id: row
            .get::<Option<i64>, _>("c_committed_event_id")
            .map(EventId::new),
        committed_week: row.get::<Option<i64>, _>("c_committed_week").map(|w| w as u32),
    })
}

pub(crate) fn parse_commitment(row: &SqliteRow) -> Result<Commitment, sqlx::Error> {
    let status: String = row.get("m_status");
    let status = CommitmentStatus::from_str(&status).map_err(decode_error)?;

    Ok(Commitment {
        id: CommitmentId::new(row.get("m_id")),
        event_id: EventId::new(row.get("m_event_id")),
        candidate_id: CandidateId::new(row.get("m_candidate_id")),
        candidate_name: row.get("m_candidate_name"),
        finish_position: row
            .get::<Option<i64>, _>("m_finish_position")
            .map(|p| p as u32),
        earnings: Decimal::from_units(row.get("m_earnings")),
        status,
        created_at: TimeMs::new(row.get("m_created_at")),
        scored_at: row.get::<Option<i64>, _>("m_scored_at").map(TimeMs::new),
    })
}
