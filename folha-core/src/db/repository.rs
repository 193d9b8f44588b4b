use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    InssBracket, IrrfBracket, NewPayrollCalculation, ParameterKey, ParameterValue,
    PayrollCalculation, PayrollParameters,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("parameter '{0}' has no value effective for the requested date")]
    MissingParameter(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Storage contract for the payroll reference data and calculation records.
///
/// Bracket and parameter queries resolve "the rows effective as of date D":
/// a row is effective when `effective_from <= D` and `effective_to` is null
/// or `>= D` (inclusive on both ends). Bracket sets come back sorted by
/// `order`, ready for the calculators.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    // Bracket tables
    async fn get_inss_brackets(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<InssBracket>, RepositoryError>;

    async fn get_irrf_brackets(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<IrrfBracket>, RepositoryError>;

    async fn insert_inss_bracket(
        &self,
        bracket: &InssBracket,
    ) -> Result<(), RepositoryError>;

    async fn delete_inss_brackets(
        &self,
        effective_from: NaiveDate,
    ) -> Result<(), RepositoryError>;

    async fn insert_irrf_bracket(
        &self,
        bracket: &IrrfBracket,
    ) -> Result<(), RepositoryError>;

    async fn delete_irrf_brackets(
        &self,
        effective_from: NaiveDate,
    ) -> Result<(), RepositoryError>;

    // Parameters
    async fn get_parameter(
        &self,
        key: ParameterKey,
        as_of: NaiveDate,
    ) -> Result<ParameterValue, RepositoryError>;

    /// Assembles the full snapshot for one reference date. Fails with
    /// [`RepositoryError::MissingParameter`] when a required key has no
    /// effective value; optional keys resolve to `None`.
    async fn get_parameters(
        &self,
        as_of: NaiveDate,
    ) -> Result<PayrollParameters, RepositoryError>;

    async fn upsert_parameter(
        &self,
        value: &ParameterValue,
    ) -> Result<(), RepositoryError>;

    // Payroll calculation records
    async fn create_calculation(
        &self,
        calc: NewPayrollCalculation,
    ) -> Result<PayrollCalculation, RepositoryError>;

    async fn get_calculation(&self, id: i64) -> Result<PayrollCalculation, RepositoryError>;

    async fn update_calculation(
        &self,
        calc: &PayrollCalculation,
    ) -> Result<(), RepositoryError>;

    async fn delete_calculation(&self, id: i64) -> Result<(), RepositoryError>;

    /// Lists calculations, optionally restricted to one competência
    /// `(year, month)`.
    async fn list_calculations(
        &self,
        competency: Option<(i32, i32)>,
    ) -> Result<Vec<PayrollCalculation>, RepositoryError>;
}
