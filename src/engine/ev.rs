//! Tier-based expected value for planning.
//!
//! Values produced here rank candidate/event pairings and feed reservation
//! displays. They are never written into a commitment's earnings.

use super::AmountOverflow;
use crate::domain::{Decimal, Tier};
use rust_decimal::Decimal as RustDecimal;
use rust_decimal_macros::dec;

/// Cumulative finish probabilities for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProbabilities {
    pub win: RustDecimal,
    pub top5: RustDecimal,
    pub top10: RustDecimal,
    pub top20: RustDecimal,
    pub make_cut: RustDecimal,
}

const ELITE: TierProbabilities = TierProbabilities {
    win: dec!(0.12),
    top5: dec!(0.40),
    top10: dec!(0.58),
    top20: dec!(0.75),
    make_cut: dec!(0.90),
};

const CONTENDER: TierProbabilities = TierProbabilities {
    win: dec!(0.05),
    top5: dec!(0.22),
    top10: dec!(0.38),
    top20: dec!(0.58),
    make_cut: dec!(0.82),
};

const SOLID: TierProbabilities = TierProbabilities {
    win: dec!(0.02),
    top5: dec!(0.10),
    top10: dec!(0.20),
    top20: dec!(0.38),
    make_cut: dec!(0.68),
};

const LONGSHOT: TierProbabilities = TierProbabilities {
    win: dec!(0.005),
    top5: dec!(0.03),
    top10: dec!(0.08),
    top20: dec!(0.18),
    make_cut: dec!(0.50),
};

/// Portion of the win-excluded top-5 mass assumed to land in second place.
const SECOND_PLACE_FRACTION: RustDecimal = dec!(0.25);

/// Assumed purse share per disjoint outcome band:
/// win, second, rest of top 5, 6-10, 11-20, made cut outside top 20.
const BAND_SHARES: [RustDecimal; 6] = [
    dec!(0.18),
    dec!(0.109),
    dec!(0.048),
    dec!(0.032),
    dec!(0.018),
    dec!(0.008),
];

pub fn probabilities(tier: Tier) -> &'static TierProbabilities {
    match tier {
        Tier::Elite => &ELITE,
        Tier::Contender => &CONTENDER,
        Tier::Solid => &SOLID,
        Tier::Longshot => &LONGSHOT,
    }
}

/// Split cumulative probabilities into the six disjoint bands of `BAND_SHARES`.
fn outcome_bands(p: &TierProbabilities) -> [RustDecimal; 6] {
    let top5_minus_win = p.top5 - p.win;
    let second = SECOND_PLACE_FRACTION * top5_minus_win;
    [
        p.win,
        second,
        top5_minus_win - second,
        p.top10 - p.top5,
        p.top20 - p.top10,
        p.make_cut - p.top20,
    ]
}

/// Expected earnings for a tier at an event with this purse and multiplier.
pub fn expected_value(
    tier: Tier,
    purse: Decimal,
    multiplier: Decimal,
) -> Result<Decimal, AmountOverflow> {
    let share: RustDecimal = outcome_bands(probabilities(tier))
        .iter()
        .zip(BAND_SHARES.iter())
        .map(|(band, share)| band * share)
        .sum();
    purse
        .checked_mul(multiplier)
        .and_then(|effective| effective.checked_mul(Decimal::new(share)))
        .ok_or(AmountOverflow { purse, multiplier })
}
