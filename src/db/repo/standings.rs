//! Incremental segment standings.

use crate::domain::{Decimal, FinishPosition, SegmentStanding};
use sqlx::{Row, SqliteConnection};

use super::Repository;

impl Repository {
    /// Stored standings, ordered by the first week each segment was played.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_segment_standings(&self) -> Result<Vec<SegmentStanding>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT s.segment, s.total, s.events_completed, s.best_finish
            FROM segment_standings s
            LEFT JOIN (
                SELECT segment, MIN(week) AS first_week FROM events GROUP BY segment
            ) w ON w.segment = s.segment
            ORDER BY w.first_week IS NULL, w.first_week ASC, s.segment ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SegmentStanding {
                segment: row.get("segment"),
                total: Decimal::from_units(row.get("total")),
                events_completed: row.get::<i64, _>("events_completed") as u32,
                best_finish: row.get::<Option<i64>, _>("best_finish").map(|f| f as u32),
            })
            .collect())
    }

    /// Replace the stored standings with `standings` in one transaction.
    ///
    /// Totals must be whole units.
    pub async fn replace_segment_standings(
        &self,
        standings: &[SegmentStanding],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.begin_write().await?;

        sqlx::query("DELETE FROM segment_standings")
            .execute(&mut *tx)
            .await?;

        for standing in standings {
            let total = standing.total.to_units().ok_or_else(|| {
                sqlx::Error::Protocol(format!(
                    "segment {} total {} is not a whole amount",
                    standing.segment, standing.total
                ))
            })?;
            sqlx::query(
                r#"
                INSERT INTO segment_standings (segment, total, events_completed, best_finish)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&standing.segment)
            .bind(total)
            .bind(standing.events_completed as i64)
            .bind(standing.best_finish.map(|f| f as i64))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }
}

/// Fold one scored result into its segment row on an open transaction.
///
/// A single upsert, so two results for the same segment never lose an update.
pub(super) async fn increment_segment_standing(
    conn: &mut SqliteConnection,
    segment: &str,
    earnings_units: i64,
    finish: Option<FinishPosition>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO segment_standings (segment, total, events_completed, best_finish)
        VALUES (?1, ?2, 1, ?3)
        ON CONFLICT(segment) DO UPDATE SET
            total = total + excluded.total,
            events_completed = events_completed + 1,
            best_finish = CASE
                WHEN excluded.best_finish IS NULL THEN best_finish
                WHEN best_finish IS NULL THEN excluded.best_finish
                ELSE MIN(best_finish, excluded.best_finish)
            END
        "#,
    )
    .bind(segment)
    .bind(earnings_units)
    .bind(finish.map(|f| f as i64))
    .execute(&mut *conn)
    .await?;

    Ok(())
}
