//! Event registry: the fixed weekly schedule and its completion state.

use super::Clock;
use crate::db::Repository;
use crate::domain::{validate_amounts, Event, EventId, Week};
use crate::error::LedgerError;
use crate::feed::EventRecord;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct EventRegistry {
    repo: Arc<Repository>,
    clock: Arc<dyn Clock>,
}

impl EventRegistry {
    pub fn new(repo: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// The event in progress today, else the next one to start.
    ///
    /// Events whose end date has passed are flagged complete first.
    pub async fn current(&self) -> Result<Event, LedgerError> {
        let today = self.clock.today();
        let flagged = self.repo.mark_elapsed_events_completed(today).await?;
        if flagged > 0 {
            info!(flagged, %today, "Flagged elapsed events complete");
        }

        self.repo
            .find_current_event(today)
            .await?
            .ok_or(LedgerError::NoCurrentEvent)
    }

    pub async fn schedule(&self) -> Result<Vec<Event>, LedgerError> {
        Ok(self.repo.list_events().await?)
    }

    pub async fn get(&self, id: EventId) -> Result<Event, LedgerError> {
        self.repo
            .get_event(id)
            .await?
            .ok_or(LedgerError::EventNotFound(id))
    }

    pub async fn by_week(&self, week: Week) -> Result<Event, LedgerError> {
        self.repo
            .get_event_by_week(week)
            .await?
            .ok_or(LedgerError::WeekNotFound(week))
    }

    /// Flag an event complete and record its winner if none is set yet.
    ///
    /// Reservations left pointing at completed weeks are dropped.
    pub async fn complete(&self, id: EventId, winner: Option<&str>) -> Result<Event, LedgerError> {
        let winner = match winner.map(str::trim) {
            Some("") => {
                return Err(LedgerError::Validation(
                    "winner must not be empty".to_string(),
                ))
            }
            other => other,
        };

        if !self.repo.complete_event(id, winner).await? {
            return Err(LedgerError::EventNotFound(id));
        }

        let pruned = self.repo.prune_stale_reservations(self.clock.today()).await?;
        info!(event_id = %id, winner = winner.unwrap_or("-"), pruned, "Event completed");

        self.get(id).await
    }

    /// Insert feed records not yet stored.
    ///
    /// Stored events keep their week. New events are numbered after the last
    /// stored week, by start date then id. Returns the number of new events.
    pub async fn load(&self, mut records: Vec<EventRecord>) -> Result<usize, LedgerError> {
        for r in &records {
            validate_amounts(r.purse, r.multiplier)
                .map_err(|e| LedgerError::Validation(format!("event {}: {}", r.id, e)))?;
        }

        let stored = self.repo.list_events().await?;
        let last_week = stored.iter().map(|e| e.week).max().unwrap_or(0);
        let last_start = stored.iter().map(|e| e.start_date).max();

        // Drops stored ids and repeats within the feed.
        let mut seen: HashSet<EventId> = stored.iter().map(|e| e.id).collect();
        records.retain(|r| seen.insert(r.id));
        records.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        if let (Some(first), Some(last_start)) = (records.first(), last_start) {
            if first.start_date < last_start {
                warn!(
                    event_id = %first.id,
                    start_date = %first.start_date,
                    last_week,
                    "New event starts before the stored schedule ends"
                );
            }
        }

        let events: Vec<Event> = records
            .into_iter()
            .enumerate()
            .map(|(idx, r)| Event {
                id: r.id,
                week: last_week + idx as Week + 1,
                name: r.name,
                start_date: r.start_date,
                end_date: r.end_date,
                purse: r.purse,
                multiplier: r.multiplier,
                segment: r.segment,
                event_type: r.event_type,
                is_completed: r.is_completed,
                winner: None,
            })
            .collect();

        let inserted = self.repo.insert_events(&events).await?;
        debug!(new = events.len(), inserted, last_week, "Loaded schedule");
        Ok(inserted)
    }
}
