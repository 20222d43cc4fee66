//! Two-decimal arithmetic on expense amounts.
//!
//! Amounts are plain `f64` values in the ledger currency. Every comparison
//! between a declared amount and a computed total goes through
//! [`amounts_match`], which rounds both sides to cents first.
//!
//! ```rust
//! use engine::amount::{amounts_match, floor2, round2};
//!
//! assert_eq!(round2(10.005_1), 10.01);
//! assert_eq!(floor2(33.339), 33.33);
//! assert!(amounts_match(99.999, 100.0));
//! assert!(!amounts_match(99.98, 100.0));
//! ```

/// Smallest amount an expense may declare.
pub const MIN_EXPENSE_AMOUNT: f64 = 1.0;

/// Rounds to the nearest cent.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds toward negative infinity at the second decimal.
#[must_use]
pub fn floor2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// `true` when both amounts are the same once rounded to cents.
#[must_use]
pub fn amounts_match(a: f64, b: f64) -> bool {
    round2(a) == round2(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn floor2_truncates_extra_decimals() {
        assert_eq!(floor2(33.333_333), 33.33);
        assert_eq!(floor2(66.666_666), 66.66);
        assert_eq!(floor2(5.0), 5.0);
    }

    #[test]
    fn amounts_match_within_a_cent_rounding() {
        assert!(amounts_match(33.333 * 3.0, 100.0));
        assert!(amounts_match(50.004, 50.0));
        assert!(!amounts_match(50.01, 50.0));
        assert!(!amounts_match(98.0, 100.0));
    }
}
