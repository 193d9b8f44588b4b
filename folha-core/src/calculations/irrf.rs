//! IRRF withholding calculation.
//!
//! IRRF uses the simplified progressive table: the taxable base is matched
//! against a single band, the band's rate applies to the *entire* base, and
//! the band's fixed deduction (parcela a deduzir) is subtracted afterwards.
//! The deduction is what makes the flat-rate-on-full-base method equivalent
//! to true incremental banding.
//!
//! The taxable base itself is the gross base minus the INSS contribution and
//! minus a fixed deduction per dependent, floored at zero.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use folha_core::IrrfBracket;
//! use folha_core::calculations::calculate_irrf;
//!
//! let effective_from = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
//! let brackets = vec![
//!     IrrfBracket {
//!         lower_bound: dec!(0),
//!         upper_bound: Some(dec!(1000)),
//!         rate: dec!(0),
//!         deduction: dec!(0),
//!         order: 1,
//!         effective_from,
//!         effective_to: None,
//!     },
//!     IrrfBracket {
//!         lower_bound: dec!(1000),
//!         upper_bound: None,
//!         rate: dec!(15),
//!         deduction: dec!(100),
//!         order: 2,
//!         effective_from,
//!         effective_to: None,
//!     },
//! ];
//!
//! let result = calculate_irrf(dec!(2000), dec!(0), 0, &brackets, dec!(200)).unwrap();
//!
//! // 2000 * 15% - 100
//! assert_eq!(result.value, dec!(200.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::common::{apply_rate, round_half_up};
use crate::models::IrrfBracket;

/// The band the taxable base fell into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfBandMatch {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub deduction: Decimal,
}

/// Result of an IRRF calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrfResult {
    /// Taxable base: gross − INSS − dependents × per-dependent deduction,
    /// floored at zero.
    pub base: Decimal,
    /// The matched band, or `None` when the base sits below the first band.
    pub band: Option<IrrfBandMatch>,
    /// Rate applied to the full base (zero when exempt).
    pub rate: Decimal,
    /// Fixed deduction subtracted after applying the rate.
    pub deduction_applied: Decimal,
    /// Final withholding, floored at zero and rounded half-up to two decimals.
    pub value: Decimal,
}

/// Computes the IRRF withholding for `gross_base`.
///
/// A base exactly on a band boundary belongs to the higher band, consistent
/// with the half-open `[lower_bound, upper_bound)` convention used across
/// the bracket tables.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] — a negative amount was supplied.
/// - [`CalculationError::EmptyBracketTable`] — `brackets` is empty.
/// - [`CalculationError::BracketTableIncomplete`] — the table has a gap and
///   no band contains the taxable base. Never silently returns zero.
pub fn calculate_irrf(
    gross_base: Decimal,
    inss_value: Decimal,
    dependent_count: u32,
    brackets: &[IrrfBracket],
    per_dependent_deduction: Decimal,
) -> Result<IrrfResult, CalculationError> {
    if gross_base < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "gross base must not be negative, got {gross_base}"
        )));
    }
    if inss_value < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "INSS value must not be negative, got {inss_value}"
        )));
    }
    if per_dependent_deduction < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "per-dependent deduction must not be negative, got {per_dependent_deduction}"
        )));
    }
    if brackets.is_empty() {
        return Err(CalculationError::EmptyBracketTable);
    }

    let dependent_deduction = per_dependent_deduction * Decimal::from(dependent_count);
    let base = (gross_base - inss_value - dependent_deduction).max(Decimal::ZERO);

    // Below the first band there is nothing to match: the base is exempt.
    if base < brackets[0].lower_bound {
        return Ok(IrrfResult {
            base,
            band: None,
            rate: Decimal::ZERO,
            deduction_applied: Decimal::ZERO,
            value: Decimal::ZERO,
        });
    }

    let bracket = brackets
        .iter()
        .find(|b| base >= b.lower_bound && b.upper_bound.is_none_or(|upper| base < upper))
        .ok_or(CalculationError::BracketTableIncomplete { base })?;

    let gross_tax = apply_rate(base, bracket.rate);
    let value = round_half_up((gross_tax - bracket.deduction).max(Decimal::ZERO));

    Ok(IrrfResult {
        base,
        band: Some(IrrfBandMatch {
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            deduction: bracket.deduction,
        }),
        rate: bracket.rate,
        deduction_applied: bracket.deduction,
        value,
    })
}
