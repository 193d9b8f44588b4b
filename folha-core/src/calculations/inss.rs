//! Progressive INSS contribution calculation.
//!
//! The INSS contribution is computed by incremental banding: each band taxes
//! only the slice of the base that falls inside it, and the contribution is
//! the sum of the per-band slices. This differs from the IRRF table, where a
//! single band's rate applies to the whole base.
//!
//! The 2025 table, for reference:
//!
//! | Band                  | Rate  |
//! |-----------------------|-------|
//! | 0.00 – 1518.00        | 7.5%  |
//! | 1518.00 – 2793.88     | 9%    |
//! | 2793.88 – 4190.83     | 12%   |
//! | 4190.83 and above     | 14%   |
//!
//! with the contribution base capped at the ceiling (teto) of 8157.41.
//!
//! Bands are half-open `[lower_bound, upper_bound)`. Earnings past the last
//! band's upper bound are still charged at the last band's rate, so no slice
//! of the base is ever left uncharged. Rounding happens once, on the final
//! total, using half-up rounding to two decimal places.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use folha_core::InssBracket;
//! use folha_core::calculations::calculate_progressive_inss;
//!
//! let effective_from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let brackets = vec![
//!     InssBracket {
//!         lower_bound: dec!(0),
//!         upper_bound: Some(dec!(100)),
//!         rate: dec!(10),
//!         order: 1,
//!         effective_from,
//!         effective_to: None,
//!     },
//!     InssBracket {
//!         lower_bound: dec!(100),
//!         upper_bound: Some(dec!(200)),
//!         rate: dec!(20),
//!         order: 2,
//!         effective_from,
//!         effective_to: None,
//!     },
//! ];
//!
//! let result = calculate_progressive_inss(dec!(150), &brackets, None).unwrap();
//!
//! // 100 * 10% + 50 * 20%
//! assert_eq!(result.total, dec!(20.00));
//! assert_eq!(result.bands.len(), 2);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::common::{apply_rate, round_half_up};
use crate::models::InssBracket;

/// The slice of the base one band taxed, kept at full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssBandContribution {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    /// Width of the base slice that fell inside this band.
    pub taxed_amount: Decimal,
    /// `taxed_amount` at this band's rate, unrounded.
    pub contribution: Decimal,
}

/// Result of a progressive INSS calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssResult {
    /// The gross base after applying the ceiling, when one applies.
    pub base_used: Decimal,
    /// Sum of all band contributions, rounded half-up to two decimals.
    pub total: Decimal,
    /// Per-band breakdown, in band order.
    pub bands: Vec<InssBandContribution>,
}

/// Computes the progressive INSS contribution for `gross_base`.
///
/// `ceiling` caps the contribution base when `Some` and positive; `None`
/// (or a non-positive value) means the base is uncapped.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] — `gross_base` or the ceiling is
///   negative.
/// - [`CalculationError::EmptyBracketTable`] — `brackets` is empty.
pub fn calculate_progressive_inss(
    gross_base: Decimal,
    brackets: &[InssBracket],
    ceiling: Option<Decimal>,
) -> Result<InssResult, CalculationError> {
    if gross_base < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "gross base must not be negative, got {gross_base}"
        )));
    }
    if let Some(c) = ceiling
        && c < Decimal::ZERO
    {
        return Err(CalculationError::invalid_input(format!(
            "ceiling must not be negative, got {c}"
        )));
    }
    if brackets.is_empty() {
        return Err(CalculationError::EmptyBracketTable);
    }

    let base_used = match ceiling.filter(|c| *c > Decimal::ZERO) {
        Some(c) => gross_base.min(c),
        None => gross_base,
    };

    let last = brackets.len() - 1;
    let mut total = Decimal::ZERO;
    let mut bands = Vec::new();

    for (i, bracket) in brackets.iter().enumerate() {
        if base_used <= bracket.lower_bound {
            break;
        }

        // The last band absorbs everything above its lower bound, even when
        // the table publishes an upper bound for it.
        let band_top = match bracket.upper_bound.filter(|_| i != last) {
            Some(upper) => upper.min(base_used),
            None => base_used,
        };

        let taxed_amount = band_top - bracket.lower_bound;
        if taxed_amount <= Decimal::ZERO {
            continue;
        }

        let contribution = apply_rate(taxed_amount, bracket.rate);
        total += contribution;
        bands.push(InssBandContribution {
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            rate: bracket.rate,
            taxed_amount,
            contribution,
        });
    }

    Ok(InssResult {
        base_used,
        total: round_half_up(total),
        bands,
    })
}
