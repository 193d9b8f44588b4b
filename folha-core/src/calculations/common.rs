//! Shared helpers for payroll calculations: financial rounding and
//! percentage application.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero). Each calculator applies this
/// once, to its final value, so per-band rounding error never compounds.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use folha_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(509.597)), dec!(509.60));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage rate (0–100 scale) to a base amount, unrounded.
///
/// The official INSS/IRRF tables publish rates as percentages (`7.5` meaning
/// 7.5%), so every calculator takes rates on that scale and converts here.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use folha_core::calculations::common::apply_rate;
///
/// assert_eq!(apply_rate(dec!(1518.00), dec!(7.5)), dec!(113.85));
/// assert_eq!(apply_rate(dec!(5000), dec!(0)), dec!(0));
/// ```
pub fn apply_rate(
    base: Decimal,
    rate_percent: Decimal,
) -> Decimal {
    base * rate_percent / Decimal::ONE_HUNDRED
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
