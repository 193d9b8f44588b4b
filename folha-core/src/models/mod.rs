mod bracket;
mod parameters;
mod payroll_calculation;

pub use bracket::{InssBracket, IrrfBracket};
pub use parameters::{ParameterKey, ParameterValue, PayrollParameters};
pub use payroll_calculation::{NewPayrollCalculation, PayrollCalculation};
