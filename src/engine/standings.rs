//! Live segment standings, folded from scored commitments.

use crate::domain::{Decimal, FinishPosition, SegmentStanding, Week};
use std::collections::BTreeMap;

/// A scored commitment reduced to what standings need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredEntry {
    pub segment: String,
    pub week: Week,
    pub earnings: Decimal,
    pub finish_position: Option<FinishPosition>,
}

/// Fold scored entries into one standing per segment, ordered by the
/// earliest week each segment covers.
pub fn aggregate<I>(entries: I) -> Vec<SegmentStanding>
where
    I: IntoIterator<Item = ScoredEntry>,
{
    let mut by_segment: BTreeMap<String, (Week, SegmentStanding)> = BTreeMap::new();

    for entry in entries {
        let (first_week, standing) = by_segment
            .entry(entry.segment.clone())
            .or_insert_with(|| (entry.week, SegmentStanding::new(entry.segment.clone())));
        *first_week = (*first_week).min(entry.week);
        standing.apply(entry.earnings, entry.finish_position);
    }

    let mut standings: Vec<(Week, SegmentStanding)> = by_segment.into_values().collect();
    order_by_first_week(&mut standings);
    standings.into_iter().map(|(_, s)| s).collect()
}

/// Sort precomputed standings the same way `aggregate` does.
pub fn order_by_first_week(standings: &mut [(Week, SegmentStanding)]) {
    standings.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.segment.cmp(&b.1.segment)));
}
