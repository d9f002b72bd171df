//! Schedule and completion operations for the repository.

use crate::domain::{Event, EventId, Week};
use chrono::NaiveDate;

use super::{format_date, parse_event, Repository, EVENT_COLUMNS};

impl Repository {
    /// Insert scheduled events in one transaction.
    ///
    /// Events that already exist are left untouched, so their completion flag
    /// and winner never revert. Returns the number of newly inserted events.
    ///
    /// # Errors
    /// Returns an error if the transaction fails, e.g. on a week collision.
    pub async fn insert_events(&self, events: &[Event]) -> Result<usize, sqlx::Error> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0usize;
        let mut tx = self.begin_write().await?;

        for event in events {
            let result = sqlx::query(
                r#"
                INSERT INTO events (
                    id, week, name, start_date, end_date, purse, multiplier,
                    segment, event_type, is_completed, winner
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(event.id.as_i64())
            .bind(event.week as i64)
            .bind(&event.name)
            .bind(format_date(event.start_date))
            .bind(format_date(event.end_date))
            .bind(event.purse.to_canonical_string())
            .bind(event.multiplier.to_canonical_string())
            .bind(&event.segment)
            .bind(&event.event_type)
            .bind(event.is_completed as i64)
            .bind(event.winner.as_deref())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// All events ordered by week.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        let sql = format!("SELECT {} FROM events e ORDER BY e.week ASC", EVENT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(parse_event).collect()
    }

    /// Get an event by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_event(&self, id: EventId) -> Result<Option<Event>, sqlx::Error> {
        let sql = format!("SELECT {} FROM events e WHERE e.id = ?", EVENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_event).transpose()
    }

    /// Get the event scheduled for a week.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_event_by_week(&self, week: Week) -> Result<Option<Event>, sqlx::Error> {
        let sql = format!("SELECT {} FROM events e WHERE e.week = ?", EVENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(week as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_event).transpose()
    }

    /// Flag every event whose end date is before `today` as complete.
    ///
    /// Touches only `is_completed` and only ever sets it. Returns the number of
    /// events newly flagged.
    pub async fn mark_elapsed_events_completed(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE events SET is_completed = 1 WHERE is_completed = 0 AND end_date < ?")
                .bind(format_date(today))
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Flag an event complete, filling the winner if one was not already set.
    ///
    /// Returns false if the event does not exist.
    pub async fn complete_event(
        &self,
        id: EventId,
        winner: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET is_completed = 1, winner = COALESCE(winner, ?) WHERE id = ?",
        )
        .bind(winner)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The open event running on `today`, else the soonest open event after it.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_current_event(&self, today: NaiveDate) -> Result<Option<Event>, sqlx::Error> {
        let today = format_date(today);

        let in_progress = format!(
            "SELECT {} FROM events e
             WHERE e.is_completed = 0 AND e.start_date <= ? AND e.end_date >= ?
             ORDER BY e.week ASC LIMIT 1",
            EVENT_COLUMNS
        );
        let row = sqlx::query(&in_progress)
            .bind(&today)
            .bind(&today)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = row {
            return parse_event(&row).map(Some);
        }

        let upcoming = format!(
            "SELECT {} FROM events e
             WHERE e.is_completed = 0 AND e.start_date > ?
             ORDER BY e.start_date ASC, e.week ASC LIMIT 1",
            EVENT_COLUMNS
        );
        let row = sqlx::query(&upcoming)
            .bind(&today)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_event).transpose()
    }
}
