//! Mock season feed for testing without files.

use super::{CandidateRecord, EventRecord, FeedError, SeasonFeed};
use async_trait::async_trait;

/// Feed that returns predefined records.
#[derive(Debug, Clone, Default)]
pub struct MockSeasonFeed {
    events: Vec<EventRecord>,
    candidates: Vec<CandidateRecord>,
    fail_with: Option<String>,
}

impl MockSeasonFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: Vec<EventRecord>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_candidate(mut self, candidate: CandidateRecord) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<CandidateRecord>) -> Self {
        self.candidates.extend(candidates);
        self
    }

    /// Make every fetch fail with this message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    fn check(&self) -> Result<(), FeedError> {
        match &self.fail_with {
            Some(message) => Err(FeedError::InvalidRecord(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SeasonFeed for MockSeasonFeed {
    async fn fetch_events(&self) -> Result<Vec<EventRecord>, FeedError> {
        self.check()?;
        Ok(self.events.clone())
    }

    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, FeedError> {
        self.check()?;
        Ok(self.candidates.clone())
    }
}
