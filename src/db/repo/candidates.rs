//! Candidate registry operations for the repository.

use crate::domain::{Candidate, CandidateId, EventId, Tier, Week};
use sqlx::SqliteConnection;

use super::{parse_candidate, Repository, CANDIDATE_COLUMNS};

impl Repository {
    /// Register a candidate or refresh its ranking.
    ///
    /// Commitment fields are never touched here.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_candidate(
        &self,
        name: &str,
        rank: Option<u32>,
        tier: Tier,
    ) -> Result<Candidate, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO candidates (name, world_rank, tier)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                world_rank = excluded.world_rank,
                tier = excluded.tier
            "#,
        )
        .bind(name)
        .bind(rank.map(|r| r as i64))
        .bind(tier.ordinal())
        .execute(&self.pool)
        .await?;

        self.get_candidate_by_name(name)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// All candidates, best ranked first, unranked last.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_candidates(&self) -> Result<Vec<Candidate>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM candidates c
             ORDER BY c.world_rank IS NULL, c.world_rank ASC, c.name ASC",
            CANDIDATE_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(parse_candidate).collect()
    }

    /// Candidates that have not been committed anywhere.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_available_candidates(&self) -> Result<Vec<Candidate>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM candidates c
             WHERE c.committed_event_id IS NULL
             ORDER BY c.world_rank IS NULL, c.world_rank ASC, c.name ASC",
            CANDIDATE_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(parse_candidate).collect()
    }

    /// Get a candidate by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>, sqlx::Error> {
        let sql = format!("SELECT {} FROM candidates c WHERE c.id = ?", CANDIDATE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_candidate).transpose()
    }

    /// Get a candidate by exact name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_candidate_by_name(&self, name: &str) -> Result<Option<Candidate>, sqlx::Error> {
        let sql = format!("SELECT {} FROM candidates c WHERE c.name = ?", CANDIDATE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_candidate).transpose()
    }
}

/// Load a candidate on an open transaction.
pub(super) async fn fetch_candidate(
    conn: &mut SqliteConnection,
    id: CandidateId,
) -> Result<Option<Candidate>, sqlx::Error> {
    let sql = format!("SELECT {} FROM candidates c WHERE c.id = ?", CANDIDATE_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(parse_candidate).transpose()
}

/// Set a candidate's commitment fields on an open transaction.
///
/// Guarded on the candidate still being uncommitted; returns false when the
/// guard rejects the write.
pub(super) async fn mark_candidate_committed(
    conn: &mut SqliteConnection,
    candidate: CandidateId,
    event: EventId,
    week: Week,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE candidates
        SET committed_event_id = ?, committed_week = ?
        WHERE id = ? AND committed_event_id IS NULL
        "#,
    )
    .bind(event.as_i64())
    .bind(week as i64)
    .bind(candidate.as_i64())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
