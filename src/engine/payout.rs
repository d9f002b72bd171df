//! Finish position to earnings.

use super::AmountOverflow;
use crate::domain::{Decimal, FinishPosition};
use rust_decimal::Decimal as RustDecimal;
use rust_decimal_macros::dec;

/// Last finishing position that still earns money.
pub const LAST_PAID_POSITION: FinishPosition = 70;

/// Share of the effective purse for positions 1 through 20.
const TOP_TWENTY_SHARES: [RustDecimal; 20] = [
    dec!(0.18),
    dec!(0.109),
    dec!(0.069),
    dec!(0.049),
    dec!(0.041),
    dec!(0.0365),
    dec!(0.034),
    dec!(0.0315),
    dec!(0.0295),
    dec!(0.0275),
    dec!(0.0255),
    dec!(0.0235),
    dec!(0.0223),
    dec!(0.0211),
    dec!(0.020),
    dec!(0.0189),
    dec!(0.0178),
    dec!(0.0167),
    dec!(0.0156),
    dec!(0.0145),
];

/// Flat share for positions 21 through 70.
const MADE_CUT_SHARE: RustDecimal = dec!(0.01);

/// Share of the effective purse paid for a finish, if any.
pub fn payout_share(position: Option<FinishPosition>) -> Option<Decimal> {
    match position? {
        p @ 1..=20 => Some(Decimal::new(TOP_TWENTY_SHARES[(p - 1) as usize])),
        21..=LAST_PAID_POSITION => Some(Decimal::new(MADE_CUT_SHARE)),
        _ => None,
    }
}

/// Earnings for a finish, rounded to whole units.
///
/// A missing position (missed cut, withdrawal) or anything past 70th pays nothing.
pub fn earnings(
    position: Option<FinishPosition>,
    purse: Decimal,
    multiplier: Decimal,
) -> Result<Decimal, AmountOverflow> {
    let Some(share) = payout_share(position) else {
        return Ok(Decimal::zero());
    };
    purse
        .checked_mul(multiplier)
        .and_then(|effective| effective.checked_mul(share))
        .map(|amount| amount.round_units())
        .ok_or(AmountOverflow { purse, multiplier })
}
