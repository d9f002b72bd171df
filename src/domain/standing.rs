//! Per-segment standings.

use crate::domain::{Decimal, FinishPosition};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStanding {
    pub segment: String,
    pub total: Decimal,
    pub events_completed: u32,
    pub best_finish: Option<FinishPosition>,
}

impl SegmentStanding {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            total: Decimal::zero(),
            events_completed: 0,
            best_finish: None,
        }
    }

    /// Fold one scored result in. Not idempotent: each result must be applied once.
    pub fn apply(&mut self, earnings: Decimal, finish: Option<FinishPosition>) {
        self.total = self.total + earnings;
        self.events_completed += 1;
        self.best_finish = match (self.best_finish, finish) {
            (Some(best), Some(f)) => Some(best.min(f)),
            (None, f) => f,
            (best, None) => best,
        };
    }
}
