//! Reservation planner operations for the repository.

use crate::domain::{CandidateId, Reservation, TimeMs, Week};
use crate::error::{is_unique_violation, LedgerError};
use chrono::NaiveDate;
use sqlx::Row;

use super::candidates::fetch_candidate;
use super::{
    format_date, parse_candidate, parse_event, ReservationRow, Repository, CANDIDATE_COLUMNS,
    EVENT_COLUMNS,
};

impl Repository {
    /// Reserve `candidate` for `week`, evicting whoever held that week.
    ///
    /// Preconditions are re-checked inside the transaction and the insert is
    /// guarded on the candidate still being uncommitted.
    ///
    /// # Errors
    /// `CandidateNotFound`, `CandidateAlreadyCommitted`, `WeekNotFound`,
    /// `EventCompleted`, `ReservationCollision`, or a storage error.
    pub async fn upsert_reservation(
        &self,
        candidate_id: CandidateId,
        week: Week,
        today: NaiveDate,
        now: TimeMs,
    ) -> Result<Reservation, LedgerError> {
        let mut tx = self.begin_write().await?;

        let candidate = fetch_candidate(&mut *tx, candidate_id)
            .await?
            .ok_or(LedgerError::CandidateNotFound(candidate_id))?;
        if candidate.is_committed() {
            return Err(LedgerError::CandidateAlreadyCommitted {
                candidate_id,
                week: candidate.committed_week,
            });
        }

        let sql = format!("SELECT {} FROM events e WHERE e.week = ?", EVENT_COLUMNS);
        let event = sqlx::query(&sql)
            .bind(week as i64)
            .fetch_optional(&mut *tx)
            .await?
            .as_ref()
            .map(parse_event)
            .transpose()?
            .ok_or(LedgerError::WeekNotFound(week))?;
        if event.is_complete_on(today) {
            return Err(LedgerError::EventCompleted(event.id));
        }

        // Last writer for a week wins.
        sqlx::query("DELETE FROM reservations WHERE week = ? AND candidate_id != ?")
            .bind(week as i64)
            .bind(candidate_id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO reservations (candidate_id, week, updated_at)
            SELECT ?, ?, ?
            WHERE EXISTS (
                SELECT 1 FROM candidates WHERE id = ? AND committed_event_id IS NULL
            )
            ON CONFLICT(candidate_id) DO UPDATE SET
                week = excluded.week,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(candidate_id.as_i64())
        .bind(week as i64)
        .bind(now.as_i64())
        .bind(candidate_id.as_i64())
        .execute(&mut *tx)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e) => return Err(LedgerError::ReservationCollision(week)),
            Err(e) => return Err(e.into()),
        };
        if result.rows_affected() == 0 {
            return Err(LedgerError::CandidateAlreadyCommitted {
                candidate_id,
                week: None,
            });
        }

        tx.commit().await?;

        Ok(Reservation {
            candidate_id,
            week,
            updated_at: now,
        })
    }

    /// Delete the reservation held by a candidate. Returns rows removed.
    pub async fn delete_reservation_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE candidate_id = ?")
            .bind(candidate_id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete the reservation at a week. Returns rows removed.
    pub async fn delete_reservation_for_week(&self, week: Week) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE week = ?")
            .bind(week as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reservations joined with candidate and event, ordered by week.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_reservation_rows(&self) -> Result<Vec<ReservationRow>, sqlx::Error> {
        let sql = format!(
            "SELECT r.candidate_id, r.week, r.updated_at, {}, {}
             FROM reservations r
             JOIN candidates c ON c.id = r.candidate_id
             JOIN events e ON e.week = r.week
             ORDER BY r.week ASC",
            CANDIDATE_COLUMNS, EVENT_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(ReservationRow {
                    reservation: Reservation {
                        candidate_id: CandidateId::new(row.get("candidate_id")),
                        week: row.get::<i64, _>("week") as u32,
                        updated_at: TimeMs::new(row.get("updated_at")),
                    },
                    candidate: parse_candidate(row)?,
                    event: parse_event(row)?,
                })
            })
            .collect()
    }

    /// Drop reservations pointing at weeks whose event is complete on `today`.
    ///
    /// Returns rows removed.
    pub async fn prune_stale_reservations(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM reservations
            WHERE week IN (
                SELECT week FROM events WHERE is_completed = 1 OR end_date < ?
            )
            "#,
        )
        .bind(format_date(today))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
