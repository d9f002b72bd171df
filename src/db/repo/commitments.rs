//! Commitment ledger operations for the repository.
//!
//! `commit_candidate` and `apply_result` are the two ledger transitions. Each
//! runs its checks and writes in a single transaction that holds the write
//! lock from its first statement, so a writer that queued behind another sees
//! its commitment and reports the conflict. Unique indexes and guarded updates
//! back this up.

use crate::domain::{
    CandidateId, Commitment, CommitmentId, CommitmentView, Decimal, EventId, FinishPosition,
    ScoredResult, TimeMs,
};
use crate::engine::ScoredEntry;
use crate::error::{is_unique_violation, LedgerError};
use chrono::NaiveDate;
use sqlx::{Row, SqliteConnection};

use super::candidates::{fetch_candidate, mark_candidate_committed};
use super::standings::increment_segment_standing;
use super::{parse_commitment, parse_event, Repository, COMMITMENT_COLUMNS, EVENT_COLUMNS};

impl Repository {
    /// Commit a candidate to an event.
    ///
    /// Checks, in order: event exists and is open on `today`; the event has no
    /// commitment; the candidate exists and has never been committed. Then
    /// inserts the commitment, marks the candidate and drops its reservation.
    ///
    /// # Errors
    /// `EventNotFound`, `EventCompleted`, `DuplicateCommitment`,
    /// `CandidateNotFound`, `CandidateAlreadyCommitted`, or a storage error.
    pub async fn commit_candidate(
        &self,
        event_id: EventId,
        candidate_id: CandidateId,
        today: NaiveDate,
        now: TimeMs,
    ) -> Result<Commitment, LedgerError> {
        let mut tx = self.begin_write().await?;

        let sql = format!("SELECT {} FROM events e WHERE e.id = ?", EVENT_COLUMNS);
        let event = sqlx::query(&sql)
            .bind(event_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?
            .as_ref()
            .map(parse_event)
            .transpose()?
            .ok_or(LedgerError::EventNotFound(event_id))?;
        if event.is_complete_on(today) {
            return Err(LedgerError::EventCompleted(event_id));
        }

        let existing = sqlx::query("SELECT id FROM commitments WHERE event_id = ?")
            .bind(event_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateCommitment(event_id));
        }

        let candidate = fetch_candidate(&mut *tx, candidate_id)
            .await?
            .ok_or(LedgerError::CandidateNotFound(candidate_id))?;
        if candidate.is_committed() {
            return Err(LedgerError::CandidateAlreadyCommitted {
                candidate_id,
                week: candidate.committed_week,
            });
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO commitments (event_id, candidate_id, candidate_name, earnings, status, created_at)
            VALUES (?, ?, ?, 0, 'pending', ?)
            "#,
        )
        .bind(event_id.as_i64())
        .bind(candidate_id.as_i64())
        .bind(&candidate.name)
        .bind(now.as_i64())
        .execute(&mut *tx)
        .await;

        let commitment_id = match inserted {
            Ok(result) => CommitmentId::new(result.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => {
                return Err(unique_violation_to_conflict(&e, event_id, candidate_id))
            }
            Err(e) => return Err(e.into()),
        };

        if !mark_candidate_committed(&mut *tx, candidate_id, event_id, event.week).await? {
            return Err(LedgerError::CandidateAlreadyCommitted {
                candidate_id,
                week: None,
            });
        }

        sqlx::query("DELETE FROM reservations WHERE candidate_id = ?")
            .bind(candidate_id.as_i64())
            .execute(&mut *tx)
            .await?;

        let commitment = fetch_commitment(&mut *tx, commitment_id)
            .await?
            .ok_or(LedgerError::CommitmentNotFound(commitment_id))?;

        tx.commit().await?;
        Ok(commitment)
    }

    /// Record a commitment's result and fold it into its segment standing.
    ///
    /// The `pending -> scored` flip is guarded so the standings increment runs
    /// at most once per commitment. Re-recording identical values returns the
    /// stored result with `applied = false`.
    ///
    /// # Errors
    /// `CommitmentNotFound`, `ResultAlreadyRecorded`, or a storage error.
    pub async fn apply_result(
        &self,
        commitment_id: CommitmentId,
        finish_position: Option<FinishPosition>,
        earnings_units: i64,
        now: TimeMs,
    ) -> Result<ScoredResult, LedgerError> {
        let mut tx = self.begin_write().await?;

        let row = sqlx::query(
            r#"
            SELECT e.segment
            FROM commitments m
            JOIN events e ON e.id = m.event_id
            WHERE m.id = ?
            "#,
        )
        .bind(commitment_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::CommitmentNotFound(commitment_id))?;
        let segment: String = row.get("segment");

        let updated = sqlx::query(
            r#"
            UPDATE commitments
            SET finish_position = ?, earnings = ?, status = 'scored', scored_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(finish_position.map(|p| p as i64))
        .bind(earnings_units)
        .bind(now.as_i64())
        .bind(commitment_id.as_i64())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let existing = fetch_commitment(&mut *tx, commitment_id)
                .await?
                .ok_or(LedgerError::CommitmentNotFound(commitment_id))?;
            let same = existing.finish_position == finish_position
                && existing.earnings == Decimal::from_units(earnings_units);
            if !same {
                return Err(LedgerError::ResultAlreadyRecorded(commitment_id));
            }
            return Ok(ScoredResult {
                commitment_id,
                finish_position,
                earnings: existing.earnings,
                applied: false,
            });
        }

        increment_segment_standing(&mut *tx, &segment, earnings_units, finish_position).await?;

        tx.commit().await?;
        Ok(ScoredResult {
            commitment_id,
            finish_position,
            earnings: Decimal::from_units(earnings_units),
            applied: true,
        })
    }

    /// Get a commitment by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_commitment(&self, id: CommitmentId) -> Result<Option<Commitment>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_commitment(&mut conn, id).await
    }

    /// Commitment and event joined, for scoring.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_commitment_view(
        &self,
        id: CommitmentId,
    ) -> Result<Option<CommitmentView>, sqlx::Error> {
        let sql = format!(
            "SELECT {}, {} FROM commitments m JOIN events e ON e.id = m.event_id WHERE m.id = ?",
            COMMITMENT_COLUMNS, EVENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_commitment_view).transpose()
    }

    /// All commitments joined with their events, ordered by week.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_commitment_views(&self) -> Result<Vec<CommitmentView>, sqlx::Error> {
        let sql = format!(
            "SELECT {}, {} FROM commitments m JOIN events e ON e.id = m.event_id ORDER BY e.week ASC",
            COMMITMENT_COLUMNS, EVENT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(parse_commitment_view).collect()
    }

    /// Scored commitments reduced to standings input, ordered by week.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_scored_entries(&self) -> Result<Vec<ScoredEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT e.segment, e.week, m.earnings, m.finish_position
            FROM commitments m
            JOIN events e ON e.id = m.event_id
            WHERE m.status = 'scored'
            ORDER BY e.week ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ScoredEntry {
                segment: row.get("segment"),
                week: row.get::<i64, _>("week") as u32,
                earnings: Decimal::from_units(row.get("earnings")),
                finish_position: row
                    .get::<Option<i64>, _>("finish_position")
                    .map(|p| p as u32),
            })
            .collect())
    }

    /// Season earnings across all commitments.
    ///
    /// Earnings are whole units, so the INTEGER sum is exact.
    pub async fn sum_earnings(&self) -> Result<Decimal, sqlx::Error> {
        let row = sqlx::query("SELECT COALESCE(SUM(earnings), 0) AS total FROM commitments")
            .fetch_one(&self.pool)
            .await?;
        Ok(Decimal::from_units(row.get("total")))
    }
}

async fn fetch_commitment(
    conn: &mut SqliteConnection,
    id: CommitmentId,
) -> Result<Option<Commitment>, sqlx::Error> {
    let sql = format!("SELECT {} FROM commitments m WHERE m.id = ?", COMMITMENT_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(parse_commitment).transpose()
}

fn parse_commitment_view(row: &sqlx::sqlite::SqliteRow) -> Result<CommitmentView, sqlx::Error> {
    let commitment = parse_commitment(row)?;
    let event = parse_event(row)?;
    Ok(CommitmentView {
        commitment,
        week: event.week,
        event_name: event.name,
        start_date: event.start_date,
        end_date: event.end_date,
        purse: event.purse,
        multiplier: event.multiplier,
        segment: event.segment,
    })
}

/// Name the invariant a raced insert tripped over.
fn unique_violation_to_conflict(
    err: &sqlx::Error,
    event_id: EventId,
    candidate_id: CandidateId,
) -> LedgerError {
    let message = match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        _ => String::new(),
    };
    if message.contains("commitments.candidate_id") {
        LedgerError::CandidateAlreadyCommitted {
            candidate_id,
            week: None,
        }
    } else {
        LedgerError::DuplicateCommitment(event_id)
    }
}
