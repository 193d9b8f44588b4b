//! Payroll calculation modules.
//!
//! Each module implements one calculator from the payroll sheet: the
//! progressive INSS contribution, the IRRF withholding, the employer-side
//! charges (encargos patronais), and the consignable loan margin. The
//! [`payroll`] module chains them into the full per-employee calculation.
//!
//! All calculators are pure functions over caller-supplied bracket tables
//! and parameters; nothing here touches storage or holds state.

pub mod common;
pub mod consignable_margin;
pub mod employer_charges;
pub mod inss;
pub mod irrf;
pub mod payroll;

use rust_decimal::Decimal;
use thiserror::Error;

pub use consignable_margin::{ConsignableMargin, calculate_consignable_margin};
pub use employer_charges::{EmployerCharges, calculate_employer_charges};
pub use inss::{InssBandContribution, InssResult, calculate_progressive_inss};
pub use irrf::{IrrfBandMatch, IrrfResult, calculate_irrf};
pub use payroll::{PayrollCalculator, PayrollInput, PayrollResult, apply_remuneration_ceiling};

/// Errors shared by every payroll calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// An out-of-domain input supplied by the caller (negative amount or
    /// rate). Never retried; the caller owns user-facing messaging.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// No bracket rows were provided at all.
    #[error("no brackets provided")]
    EmptyBracketTable,

    /// The supplied bracket table does not cover the computed base. This is
    /// a data-integrity fault in the bracket provider and must surface —
    /// defaulting to zero would understate a tax liability.
    #[error("bracket table does not cover base {base}")]
    BracketTableIncomplete { base: Decimal },

    /// Bracket rows overlap, are out of order, or are degenerate.
    /// `position` is the index of the offending row.
    #[error("bracket rows overlap or are out of order at position {position}")]
    BracketTableOverlap { position: usize },
}

impl CalculationError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
