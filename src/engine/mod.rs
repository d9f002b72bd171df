//! Pure computation for payouts, planning estimates and standings.

use crate::domain::Decimal;
use thiserror::Error;

pub mod ev;
pub mod payout;
pub mod standings;

pub use ev::{expected_value, TierProbabilities};
pub use payout::{earnings, payout_share, LAST_PAID_POSITION};
pub use standings::{aggregate, ScoredEntry};

/// A purse and multiplier whose product does not fit in a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("purse {purse} x multiplier {multiplier} is out of range")]
pub struct AmountOverflow {
    pub purse: Decimal,
    pub multiplier: Decimal,
}
