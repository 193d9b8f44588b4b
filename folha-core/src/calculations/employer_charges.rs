//! Employer-side payroll charges (encargos patronais).
//!
//! Three flat percentages of the gross base: the employer INSS share, the
//! occupational-risk charge (RAT), and the other-entities levy (terceiros).
//! RAT and other-entities are optional parameters; when the agency has no
//! value configured the corresponding charge is zero, which is a valid
//! configuration rather than an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::common::{apply_rate, round_half_up};
use crate::models::PayrollParameters;

/// Result of an employer charges calculation. Each component is rounded
/// half-up to two decimals; `total` is their exact sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCharges {
    pub employer_inss: Decimal,
    pub rat: Decimal,
    pub other_entities: Decimal,
    pub total: Decimal,
}

/// Computes the employer charges over `gross_base`.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] — `gross_base` is negative.
pub fn calculate_employer_charges(
    gross_base: Decimal,
    parameters: &PayrollParameters,
) -> Result<EmployerCharges, CalculationError> {
    if gross_base < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "gross base must not be negative, got {gross_base}"
        )));
    }

    let employer_inss = round_half_up(apply_rate(gross_base, parameters.employer_inss_rate));
    let rat = round_half_up(
        parameters
            .rat_rate
            .map(|rate| apply_rate(gross_base, rate))
            .unwrap_or(Decimal::ZERO),
    );
    let other_entities = round_half_up(
        parameters
            .other_entities_rate
            .map(|rate| apply_rate(gross_base, rate))
            .unwrap_or(Decimal::ZERO),
    );

    Ok(EmployerCharges {
        employer_inss,
        rat,
        other_entities,
        total: employer_inss + rat + other_entities,
    })
}
