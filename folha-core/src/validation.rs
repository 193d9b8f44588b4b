//! Structural validation of bracket tables.
//!
//! Run at the ingestion boundary — when external rows are deserialized or
//! loaded into storage — so the calculators can assume well-formed tables
//! and keep the hot path free of re-checks. A valid table has strictly
//! increasing `order`, starts at zero, is contiguous and non-overlapping
//! under the half-open `[lower_bound, upper_bound)` convention, and is
//! open-ended only in its last row.

use rust_decimal::Decimal;

use crate::calculations::CalculationError;
use crate::models::{InssBracket, IrrfBracket};

/// Validates an INSS bracket table against the structural invariants.
///
/// # Errors
///
/// - [`CalculationError::EmptyBracketTable`] — no rows.
/// - [`CalculationError::BracketTableOverlap`] — rows out of order,
///   overlapping, degenerate, or open-ended before the last row.
/// - [`CalculationError::BracketTableIncomplete`] — the table starts above
///   zero or leaves a gap between consecutive rows.
pub fn validate_inss_table(brackets: &[InssBracket]) -> Result<(), CalculationError> {
    let rows: Vec<BoundsRow> = brackets
        .iter()
        .map(|b| BoundsRow {
            order: b.order,
            lower_bound: b.lower_bound,
            upper_bound: b.upper_bound,
        })
        .collect();
    validate_rows(&rows)
}

/// Validates an IRRF bracket table; same invariants as
/// [`validate_inss_table`].
pub fn validate_irrf_table(brackets: &[IrrfBracket]) -> Result<(), CalculationError> {
    let rows: Vec<BoundsRow> = brackets
        .iter()
        .map(|b| BoundsRow {
            order: b.order,
            lower_bound: b.lower_bound,
            upper_bound: b.upper_bound,
        })
        .collect();
    validate_rows(&rows)
}

struct BoundsRow {
    order: i32,
    lower_bound: Decimal,
    upper_bound: Option<Decimal>,
}

fn validate_rows(rows: &[BoundsRow]) -> Result<(), CalculationError> {
    if rows.is_empty() {
        return Err(CalculationError::EmptyBracketTable);
    }

    if rows[0].lower_bound != Decimal::ZERO {
        // Earnings between zero and the first lower bound would be uncovered.
        return Err(CalculationError::BracketTableIncomplete {
            base: Decimal::ZERO,
        });
    }

    let last = rows.len() - 1;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 && row.order <= rows[i - 1].order {
            return Err(CalculationError::BracketTableOverlap { position: i });
        }

        match row.upper_bound {
            None => {
                if i != last {
                    return Err(CalculationError::BracketTableOverlap { position: i });
                }
            }
            Some(upper) => {
                if upper <= row.lower_bound {
                    return Err(CalculationError::BracketTableOverlap { position: i });
                }
                if i < last {
                    let next_lower = rows[i + 1].lower_bound;
                    if next_lower < upper {
                        return Err(CalculationError::BracketTableOverlap { position: i + 1 });
                    }
                    if next_lower > upper {
                        return Err(CalculationError::BracketTableIncomplete { base: upper });
                    }
                }
            }
        }
    }

    Ok(())
}
