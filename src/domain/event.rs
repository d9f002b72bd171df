//! Scheduled events.

use crate::domain::{Decimal, EventId, Week};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Largest purse accepted from a feed or a query, in whole units.
pub const MAX_PURSE_UNITS: i64 = 1_000_000_000_000;

/// Largest payout multiplier accepted.
pub const MAX_MULTIPLIER_UNITS: i64 = 100;

/// Check that a purse and multiplier are non-negative and within bounds.
pub fn validate_amounts(purse: Decimal, multiplier: Decimal) -> Result<(), String> {
    if purse.is_negative() || multiplier.is_negative() {
        return Err("purse and multiplier must not be negative".to_string());
    }
    if purse > Decimal::from_units(MAX_PURSE_UNITS) {
        return Err(format!("purse {} exceeds {}", purse, MAX_PURSE_UNITS));
    }
    if multiplier > Decimal::from_units(MAX_MULTIPLIER_UNITS) {
        return Err(format!(
            "multiplier {} exceeds {}",
            multiplier, MAX_MULTIPLIER_UNITS
        ));
    }
    Ok(())
}

/// One week of the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub week: Week,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purse: Decimal,
    pub multiplier: Decimal,
    pub segment: String,
    pub event_type: String,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

impl Event {
    /// Nominal purse multiplied by the payout multiplier, if it fits.
    pub fn effective_purse(&self) -> Option<Decimal> {
        self.purse.checked_mul(self.multiplier)
    }

    /// Whether the event's end date is strictly before `today`.
    pub fn has_elapsed(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Complete either by flag or because the calendar has moved past it.
    pub fn is_complete_on(&self, today: NaiveDate) -> bool {
        self.is_completed || self.has_elapsed(today)
    }

    /// `today` falls inside the event's date range and it is still open.
    pub fn is_in_progress_on(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.start_date <= today && today <= self.end_date
    }
}
