//! Cash-to-shares conversion.

use serde::{Serialize, Serializer};

/// Raw value reported for a price that cannot size an order.
pub const INVALID_PRICE_SENTINEL: i64 = -1;

/// Outcome of dividing a cash budget by a share price.
///
/// `Affordable(0)` means the budget buys nothing; it is distinct from
/// `InvalidPrice`, which means the price itself was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareCount {
    Affordable(u64),
    InvalidPrice,
}

impl ShareCount {
    /// Integer form where `InvalidPrice` maps to [`INVALID_PRICE_SENTINEL`].
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Affordable(shares) => i64::try_from(shares).unwrap_or(i64::MAX),
            Self::InvalidPrice => INVALID_PRICE_SENTINEL,
        }
    }

    pub const fn shares(self) -> Option<u64> {
        match self {
            Self::Affordable(shares) => Some(shares),
            Self::InvalidPrice => None,
        }
    }

    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Affordable(0))
    }
}

impl Serialize for ShareCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.as_i64())
    }
}

/// Whole shares that `cash_amount` buys at `price_per_share`, truncated.
///
/// A zero, negative, or non-finite price yields [`ShareCount::InvalidPrice`],
/// as does a price so small that the share count would not fit the gateway's
/// signed 64-bit quantity.
pub fn compute_share_count(cash_amount: u64, price_per_share: f64) -> ShareCount {
    if !price_per_share.is_finite() || price_per_share <= 0.0 {
        return ShareCount::InvalidPrice;
    }

    let quotient = (cash_amount as f64 / price_per_share).floor();
    // 2^63 is exact in f64; anything at or above it overflows i64.
    if quotient >= MAX_SHARES_EXCLUSIVE {
        return ShareCount::InvalidPrice;
    }
    ShareCount::Affordable(quotient as u64)
}

const MAX_SHARES_EXCLUSIVE: f64 = 9_223_372_036_854_775_808.0;

/// Cash the order is expected to consume at the quoted price.
pub fn estimated_notional(shares: u64, price_per_share: f64) -> f64 {
    shares as f64 * price_per_share
}
