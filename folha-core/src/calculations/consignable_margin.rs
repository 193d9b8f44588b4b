//! Consignable loan margin (margem consignável).
//!
//! The margin is the share of net pay legally available to be pledged toward
//! payroll-deducted loans. The base is the net pay itself, already net of
//! INSS, IRRF and other deductions — a negative net pay means the upstream
//! payroll computation is wrong and is rejected here rather than papered
//! over.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::common::{apply_rate, round_half_up};

/// Result of a consignable margin calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsignableMargin {
    pub base: Decimal,
    pub margin: Decimal,
}

/// Computes the consignable margin over `net_pay`.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] — `net_pay` or `margin_rate` is
///   negative.
pub fn calculate_consignable_margin(
    net_pay: Decimal,
    margin_rate: Decimal,
) -> Result<ConsignableMargin, CalculationError> {
    if net_pay < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "net pay must not be negative, got {net_pay}"
        )));
    }
    if margin_rate < Decimal::ZERO {
        return Err(CalculationError::invalid_input(format!(
            "margin rate must not be negative, got {margin_rate}"
        )));
    }

    Ok(ConsignableMargin {
        base: net_pay,
        margin: round_half_up(apply_rate(net_pay, margin_rate)),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn margin_is_a_percentage_of_net_pay() {
        let result = calculate_consignable_margin(dec!(4198.21), dec!(35)).unwrap();

        assert_eq!(result.base, dec!(4198.21));
        // 4198.21 * 35% = 1469.3735
        assert_eq!(result.margin, dec!(1469.37));
    }

    #[test]
    fn zero_net_pay_yields_zero_margin() {
        let result = calculate_consignable_margin(dec!(0), dec!(35)).unwrap();

        assert_eq!(result.margin, dec!(0.00));
    }

    #[test]
    fn zero_rate_yields_zero_margin() {
        let result = calculate_consignable_margin(dec!(3000), dec!(0)).unwrap();

        assert_eq!(result.margin, dec!(0.00));
    }

    #[test]
    fn negative_net_pay_is_an_invalid_input() {
        let result = calculate_consignable_margin(dec!(-1), dec!(30));

        assert!(matches!(
            result,
            Err(CalculationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn negative_rate_is_an_invalid_input() {
        let result = calculate_consignable_margin(dec!(1000), dec!(-30));

        assert!(matches!(
            result,
            Err(CalculationError::InvalidInput { .. })
        ));
    }
}
