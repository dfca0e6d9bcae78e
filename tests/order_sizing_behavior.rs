//! Behavior tests for converting a cash budget into whole shares.

use proptest::prelude::*;
use tickfire_core::{
    compute_share_count, estimated_notional, normalize, ShareCount, INVALID_PRICE_SENTINEL,
};

#[test]
fn budget_of_one_thousand_buys_four_shares_at_two_fifty() {
    // Given: 1000 in cash and a 250 quote
    // When: The order is sized
    let count = compute_share_count(1_000, 250.0);

    // Then: Four whole shares are affordable at a notional of 1000
    assert_eq!(count, ShareCount::Affordable(4));
    assert_eq!(estimated_notional(4, 250.0), 1_000.0);
}

#[test]
fn budget_below_one_share_is_zero_not_the_sentinel() {
    assert_eq!(compute_share_count(100, 250.0), ShareCount::Affordable(0));
    assert_eq!(compute_share_count(50, 1_000_000.0).as_i64(), 0);
}

#[test]
fn zero_price_reports_the_sentinel() {
    let count = compute_share_count(1_000, 0.0);
    assert_eq!(count, ShareCount::InvalidPrice);
    assert_eq!(count.as_i64(), INVALID_PRICE_SENTINEL);
    assert_eq!(count.shares(), None);
}

#[test]
fn near_zero_price_is_rejected_rather_than_sized_to_billions_of_billions() {
    // Given: A degenerate quote just above zero
    // When: A modest budget is sized against it
    let count = compute_share_count(100, 1e-300);

    // Then: The price is unusable, not a saturated share count
    assert_eq!(count, ShareCount::InvalidPrice);
    assert_eq!(count.as_i64(), INVALID_PRICE_SENTINEL);
}

#[test]
fn symbols_are_uppercased() {
    assert_eq!(normalize("aapl"), "AAPL");
    assert_eq!(normalize(" brk.b "), "BRK.B");
}

proptest! {
    #[test]
    fn zero_price_is_invalid_for_any_budget(cash in any::<u64>()) {
        prop_assert_eq!(compute_share_count(cash, 0.0).as_i64(), -1);
    }

    #[test]
    fn empty_budget_buys_nothing(price in 0.01_f64..1_000_000.0) {
        prop_assert_eq!(compute_share_count(0, price), ShareCount::Affordable(0));
    }

    #[test]
    fn share_count_is_the_floor_of_cash_over_price(
        cash in 0_u64..10_000_000,
        price in 0.01_f64..100_000.0,
    ) {
        let shares = compute_share_count(cash, price)
            .shares()
            .expect("positive prices are always sizable");
        prop_assert_eq!(shares, (cash as f64 / price).floor() as u64);
        // Never spends more than the budget.
        prop_assert!(estimated_notional(shares, price) <= cash as f64 + 1e-6);
    }

    #[test]
    fn every_sizable_result_fits_a_signed_quantity(
        cash in any::<u64>(),
        price in 1e-300_f64..1.0,
    ) {
        match compute_share_count(cash, price) {
            ShareCount::Affordable(shares) => prop_assert!(i64::try_from(shares).is_ok()),
            ShareCount::InvalidPrice => prop_assert!(cash as f64 / price >= i64::MAX as f64),
        }
    }
}
