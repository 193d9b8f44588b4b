use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use folha_core::calculations::CalculationError;
use folha_core::validation::{validate_inss_table, validate_irrf_table};
use folha_core::{
    InssBracket, IrrfBracket, ParameterKey, ParameterValue, PayrollRepository, RepositoryError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when loading reference data.
#[derive(Debug, Error)]
pub enum ReferenceDataLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid bracket table effective {effective_from}: {source}")]
    InvalidTable {
        effective_from: NaiveDate,
        source: CalculationError,
    },

    #[error("Unknown parameter key '{0}'")]
    UnknownParameterKey(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ReferenceDataLoaderError {
    fn from(err: csv::Error) -> Self {
        ReferenceDataLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from an INSS bracket CSV file.
///
/// Columns: `effective_from`, `effective_to` (empty for open windows),
/// `band_order`, `lower_bound`, `upper_bound` (empty for the open-ended last
/// band), `rate` (percentage, 0–100).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InssBracketRecord {
    pub effective_from: NaiveDate,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub effective_to: Option<NaiveDate>,
    pub band_order: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

/// A single record from an IRRF bracket CSV file; same columns as
/// [`InssBracketRecord`] plus `deduction` (parcela a deduzir).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IrrfBracketRecord {
    pub effective_from: NaiveDate,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub effective_to: Option<NaiveDate>,
    pub band_order: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub deduction: Decimal,
}

/// A single record from a parameters CSV file.
///
/// Columns: `param_key` (the storage code, e.g. `teto_inss`), `value`,
/// `effective_from`, `effective_to`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParameterRecord {
    pub param_key: String,
    pub value: Decimal,
    pub effective_from: NaiveDate,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub effective_to: Option<NaiveDate>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for INSS bracket tables from CSV files.
///
/// Records are grouped by `effective_from`; each group is validated as one
/// complete table, then loaded with delete-then-insert so that re-running
/// the same file is idempotent.
pub struct InssTableLoader;

impl InssTableLoader {
    /// Parse INSS bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<InssBracketRecord>, ReferenceDataLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: InssBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate and load INSS bracket records, returning the number of rows
    /// inserted.
    ///
    /// # Errors
    ///
    /// [`ReferenceDataLoaderError::InvalidTable`] when a group violates the
    /// structural invariants; nothing from that group is written.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[InssBracketRecord],
    ) -> Result<usize, ReferenceDataLoaderError> {
        let mut inserted = 0;

        for (effective_from, brackets) in group_inss_tables(records) {
            validate_inss_table(&brackets).map_err(|source| {
                ReferenceDataLoaderError::InvalidTable {
                    effective_from,
                    source,
                }
            })?;

            repo.delete_inss_brackets(effective_from).await?;
            for bracket in &brackets {
                repo.insert_inss_bracket(bracket).await?;
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}

/// Loader for IRRF bracket tables from CSV files; same grouping, validation
/// and idempotent delete-then-insert discipline as [`InssTableLoader`].
pub struct IrrfTableLoader;

impl IrrfTableLoader {
    /// Parse IRRF bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IrrfBracketRecord>, ReferenceDataLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: IrrfBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate and load IRRF bracket records, returning the number of rows
    /// inserted.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[IrrfBracketRecord],
    ) -> Result<usize, ReferenceDataLoaderError> {
        let mut inserted = 0;

        for (effective_from, brackets) in group_irrf_tables(records) {
            validate_irrf_table(&brackets).map_err(|source| {
                ReferenceDataLoaderError::InvalidTable {
                    effective_from,
                    source,
                }
            })?;

            repo.delete_irrf_brackets(effective_from).await?;
            for bracket in &brackets {
                repo.insert_irrf_bracket(bracket).await?;
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}

/// Loader for payroll parameters from CSV files.
///
/// Upserts on (key, effective window), so re-running a file updates values
/// in place. A file that leaves a required key without a value for some
/// window it introduces is accepted — other windows may already cover it —
/// but a warning is logged per missing key.
pub struct ParameterLoader;

impl ParameterLoader {
    /// Parse parameter records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ParameterRecord>, ReferenceDataLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ParameterRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Upsert parameter records, returning the number of values written.
    ///
    /// # Errors
    ///
    /// [`ReferenceDataLoaderError::UnknownParameterKey`] when a record's key
    /// is not one of the known storage codes.
    pub async fn load<R: PayrollRepository + ?Sized>(
        repo: &R,
        records: &[ParameterRecord],
    ) -> Result<usize, ReferenceDataLoaderError> {
        let mut written = 0;
        let mut keys_by_window: BTreeMap<NaiveDate, Vec<ParameterKey>> = BTreeMap::new();

        for record in records {
            let key = ParameterKey::parse(&record.param_key).ok_or_else(|| {
                ReferenceDataLoaderError::UnknownParameterKey(record.param_key.clone())
            })?;

            repo.upsert_parameter(&ParameterValue {
                key,
                value: record.value,
                effective_from: record.effective_from,
                effective_to: record.effective_to,
            })
            .await?;
            written += 1;

            keys_by_window
                .entry(record.effective_from)
                .or_default()
                .push(key);
        }

        for (effective_from, keys) in keys_by_window {
            for key in ParameterKey::ALL {
                if !key.is_optional() && !keys.contains(&key) {
                    warn!(
                        key = key.as_str(),
                        %effective_from,
                        "required parameter not present in this load; an \
                         earlier window must still cover it"
                    );
                }
            }
        }

        Ok(written)
    }
}

fn group_inss_tables(records: &[InssBracketRecord]) -> BTreeMap<NaiveDate, Vec<InssBracket>> {
    let mut groups: BTreeMap<NaiveDate, Vec<InssBracket>> = BTreeMap::new();

    for record in records {
        groups
            .entry(record.effective_from)
            .or_default()
            .push(InssBracket {
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                rate: record.rate,
                order: record.band_order,
                effective_from: record.effective_from,
                effective_to: record.effective_to,
            });
    }

    for brackets in groups.values_mut() {
        brackets.sort_by_key(|b| b.order);
    }

    groups
}

fn group_irrf_tables(records: &[IrrfBracketRecord]) -> BTreeMap<NaiveDate, Vec<IrrfBracket>> {
    let mut groups: BTreeMap<NaiveDate, Vec<IrrfBracket>> = BTreeMap::new();

    for record in records {
        groups
            .entry(record.effective_from)
            .or_default()
            .push(IrrfBracket {
                lower_bound: record.lower_bound,
                upper_bound: record.upper_bound,
                rate: record.rate,
                deduction: record.deduction,
                order: record.band_order,
                effective_from: record.effective_from,
                effective_to: record.effective_to,
            });
    }

    for brackets in groups.values_mut() {
        brackets.sort_by_key(|b| b.order);
    }

    groups
}
