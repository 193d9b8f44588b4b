//! Full payroll calculation for one employee and one competência.
//!
//! Chains the individual calculators in the order the payroll sheet applies
//! them:
//!
//! 1. Progressive INSS over the total proventos, capped at the ceiling.
//! 2. IRRF over the proventos net of INSS and dependent deductions.
//! 3. Total descontos = INSS + IRRF + other (non-tax) deductions.
//! 4. Net pay = total proventos − total descontos.
//! 5. Employer charges over the total proventos.
//! 6. Consignable margin over the net pay.
//!
//! The whole computation is a single pure pass: if any bracket table is
//! malformed the call fails atomically, and identical inputs always produce
//! identical results.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use folha_core::{InssBracket, IrrfBracket, PayrollParameters};
//! use folha_core::calculations::{PayrollCalculator, PayrollInput};
//!
//! let effective_from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let inss = vec![InssBracket {
//!     lower_bound: dec!(0),
//!     upper_bound: Some(dec!(3000)),
//!     rate: dec!(8),
//!     order: 1,
//!     effective_from,
//!     effective_to: None,
//! }];
//! let irrf = vec![
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
//! let parameters = PayrollParameters {
//!     minimum_wage: dec!(1518.00),
//!     inss_ceiling: dec!(0),
//!     dependent_deduction: dec!(200),
//!     consignable_margin_rate: dec!(35),
//!     employer_inss_rate: dec!(20),
//!     rat_rate: None,
//!     other_entities_rate: None,
//!     remuneration_ceiling: dec!(0),
//! };
//!
//! let calculator = PayrollCalculator::new(&inss, &irrf, &parameters);
//! let result = calculator
//!     .calculate(&PayrollInput {
//!         total_proventos: dec!(3000),
//!         other_deductions: dec!(50),
//!         dependent_count: 1,
//!     })
//!     .unwrap()
//!     .expect("positive proventos always produce a result");
//!
//! assert_eq!(result.inss.total, dec!(240.00));
//! assert_eq!(result.irrf.value, dec!(284.00));
//! assert_eq!(result.total_descontos, dec!(574.00));
//! assert_eq!(result.net_pay, dec!(2426.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::consignable_margin::{ConsignableMargin, calculate_consignable_margin};
use crate::calculations::employer_charges::{EmployerCharges, calculate_employer_charges};
use crate::calculations::inss::{InssResult, calculate_progressive_inss};
use crate::calculations::irrf::{IrrfResult, calculate_irrf};
use crate::models::{InssBracket, IrrfBracket, PayrollParameters};

/// User- or record-supplied values for one payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    pub total_proventos: Decimal,
    /// Non-tax deductions (pension loans, union dues, court orders, ...).
    pub other_deductions: Decimal,
    pub dependent_count: u32,
}

/// Result of a full payroll calculation.
///
/// `total_descontos` is the exact sum of the (already rounded) INSS, IRRF
/// and other deductions, and `net_pay` the exact difference against the
/// total proventos — neither is independently recomputed, so the identities
/// in the detail sections always hold bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    pub total_proventos: Decimal,
    pub total_descontos: Decimal,
    pub net_pay: Decimal,
    pub inss: InssResult,
    pub irrf: IrrfResult,
    pub employer_charges: EmployerCharges,
    pub consignable_margin: ConsignableMargin,
}

/// Calculator for the full payroll sheet of one employee.
///
/// Borrows the bracket tables and parameter snapshot resolved for the
/// competência's reference date; construct once per snapshot and reuse
/// across employees.
#[derive(Debug, Clone)]
pub struct PayrollCalculator<'a> {
    inss_brackets: &'a [InssBracket],
    irrf_brackets: &'a [IrrfBracket],
    parameters: &'a PayrollParameters,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(
        inss_brackets: &'a [InssBracket],
        irrf_brackets: &'a [IrrfBracket],
        parameters: &'a PayrollParameters,
    ) -> Self {
        Self {
            inss_brackets,
            irrf_brackets,
            parameters,
        }
    }

    /// Runs the full calculation.
    ///
    /// Returns `Ok(None)` when `total_proventos` is zero or negative: an
    /// empty payroll line is a valid no-op, not a failure.
    ///
    /// # Errors
    ///
    /// Any [`CalculationError`] from the individual calculators; the call
    /// fails atomically with no partial result.
    pub fn calculate(
        &self,
        input: &PayrollInput,
    ) -> Result<Option<PayrollResult>, CalculationError> {
        if input.total_proventos <= Decimal::ZERO {
            return Ok(None);
        }
        if input.other_deductions < Decimal::ZERO {
            return Err(CalculationError::invalid_input(format!(
                "other deductions must not be negative, got {}",
                input.other_deductions
            )));
        }

        let inss = calculate_progressive_inss(
            input.total_proventos,
            self.inss_brackets,
            self.parameters.inss_cap(),
        )?;

        let irrf = calculate_irrf(
            input.total_proventos,
            inss.total,
            input.dependent_count,
            self.irrf_brackets,
            self.parameters.dependent_deduction,
        )?;

        let total_descontos = inss.total + irrf.value + input.other_deductions;
        let net_pay = input.total_proventos - total_descontos;

        let employer_charges =
            calculate_employer_charges(input.total_proventos, self.parameters)?;

        let consignable_margin =
            calculate_consignable_margin(net_pay, self.parameters.consignable_margin_rate)?;

        Ok(Some(PayrollResult {
            total_proventos: input.total_proventos,
            total_descontos,
            net_pay,
            inss,
            irrf,
            employer_charges,
            consignable_margin,
        }))
    }
}

/// Caps gross proventos at the constitutional remuneration ceiling (teto).
///
/// Returns the capped proventos and the abatement taken. A ceiling of zero
/// means no ceiling applies. Callers that are subject to the teto apply this
/// before building the [`PayrollInput`]; the calculator itself never caps
/// silently.
pub fn apply_remuneration_ceiling(
    total_proventos: Decimal,
    ceiling: Decimal,
) -> (Decimal, Decimal) {
    if ceiling > Decimal::ZERO && total_proventos > ceiling {
        (ceiling, total_proventos - ceiling)
    } else {
        (total_proventos, Decimal::ZERO)
    }
}
