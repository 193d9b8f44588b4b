use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use folha_core::{
    InssBracket, IrrfBracket, NewPayrollCalculation, ParameterKey, ParameterValue,
    PayrollCalculation, PayrollParameters, PayrollRepository, RepositoryError,
};
use rust_decimal::Decimal;
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<(), RepositoryError> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to read seeds directory '{}': {}",
                    seeds_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            debug!(seed = %path.display(), "executing seed file");
            let sql = std::fs::read_to_string(&path).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to read seed file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            sqlx::raw_sql(&sql).execute(&self.pool).await.map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to execute seed file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn required_value(
        &self,
        key: ParameterKey,
        as_of: NaiveDate,
    ) -> Result<Decimal, RepositoryError> {
        match self.get_parameter(key, as_of).await {
            Ok(parameter) => Ok(parameter.value),
            Err(RepositoryError::NotFound) => Err(RepositoryError::MissingParameter(
                key.as_str().to_string(),
            )),
            Err(other) => Err(other),
        }
    }

    async fn optional_value(
        &self,
        key: ParameterKey,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, RepositoryError> {
        match self.get_parameter(key, as_of).await {
            Ok(parameter) => Ok(Some(parameter.value)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(other) => Err(other),
        }
    }
}

fn get_date(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<NaiveDate, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))
}

fn get_optional_date(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<NaiveDate>, RepositoryError> {
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))
}

fn row_to_inss_bracket(row: &sqlx::sqlite::SqliteRow) -> Result<InssBracket, RepositoryError> {
    Ok(InssBracket {
        lower_bound: get_decimal(row, "lower_bound")?,
        upper_bound: get_optional_decimal(row, "upper_bound")?,
        rate: get_decimal(row, "rate")?,
        order: row
            .try_get("band_order")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        effective_from: get_date(row, "effective_from")?,
        effective_to: get_optional_date(row, "effective_to")?,
    })
}

fn row_to_irrf_bracket(row: &sqlx::sqlite::SqliteRow) -> Result<IrrfBracket, RepositoryError> {
    Ok(IrrfBracket {
        lower_bound: get_decimal(row, "lower_bound")?,
        upper_bound: get_optional_decimal(row, "upper_bound")?,
        rate: get_decimal(row, "rate")?,
        deduction: get_decimal(row, "deduction")?,
        order: row
            .try_get("band_order")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        effective_from: get_date(row, "effective_from")?,
        effective_to: get_optional_date(row, "effective_to")?,
    })
}

fn row_to_calculation(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PayrollCalculation, RepositoryError> {
    Ok(PayrollCalculation {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        competency_year: row
            .try_get("competency_year")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        competency_month: row
            .try_get("competency_month")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        employee_ref: row
            .try_get("employee_ref")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        total_proventos: get_decimal(row, "total_proventos")?,
        other_deductions: get_decimal(row, "other_deductions")?,
        dependent_count: row
            .try_get("dependent_count")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        calculated_inss: get_optional_decimal(row, "calculated_inss")?,
        calculated_irrf: get_optional_decimal(row, "calculated_irrf")?,
        calculated_total_descontos: get_optional_decimal(row, "calculated_total_descontos")?,
        calculated_net_pay: get_optional_decimal(row, "calculated_net_pay")?,
        calculated_employer_charges: get_optional_decimal(row, "calculated_employer_charges")?,
        calculated_consignable_margin: get_optional_decimal(row, "calculated_consignable_margin")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

const LIST_CALCULATION_COLUMNS: &str =
    "id, competency_year, competency_month, employee_ref, total_proventos,
     other_deductions, dependent_count, calculated_inss, calculated_irrf,
     calculated_total_descontos, calculated_net_pay, calculated_employer_charges,
     calculated_consignable_margin, created_at, updated_at";

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn get_inss_brackets(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<InssBracket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT lower_bound, upper_bound, rate, band_order, effective_from, effective_to
             FROM inss_brackets
             WHERE effective_from <= ? AND (effective_to IS NULL OR effective_to >= ?)
             ORDER BY band_order",
        )
        .bind(as_of)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_inss_bracket).collect()
    }

    async fn get_irrf_brackets(
        &self,
        as_of: NaiveDate,
    ) -> Result<Vec<IrrfBracket>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT lower_bound, upper_bound, rate, deduction, band_order,
                    effective_from, effective_to
             FROM irrf_brackets
             WHERE effective_from <= ? AND (effective_to IS NULL OR effective_to >= ?)
             ORDER BY band_order",
        )
        .bind(as_of)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_irrf_bracket).collect()
    }

    async fn insert_inss_bracket(
        &self,
        bracket: &InssBracket,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO inss_brackets
                (lower_bound, upper_bound, rate, band_order, effective_from, effective_to)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(decimal_to_f64(bracket.lower_bound))
        .bind(bracket.upper_bound.map(decimal_to_f64))
        .bind(decimal_to_f64(bracket.rate))
        .bind(bracket.order)
        .bind(bracket.effective_from)
        .bind(bracket.effective_to)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_inss_brackets(
        &self,
        effective_from: NaiveDate,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM inss_brackets WHERE effective_from = ?")
            .bind(effective_from)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn insert_irrf_bracket(
        &self,
        bracket: &IrrfBracket,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO irrf_brackets
                (lower_bound, upper_bound, rate, deduction, band_order,
                 effective_from, effective_to)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(decimal_to_f64(bracket.lower_bound))
        .bind(bracket.upper_bound.map(decimal_to_f64))
        .bind(decimal_to_f64(bracket.rate))
        .bind(decimal_to_f64(bracket.deduction))
        .bind(bracket.order)
        .bind(bracket.effective_from)
        .bind(bracket.effective_to)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_irrf_brackets(
        &self,
        effective_from: NaiveDate,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM irrf_brackets WHERE effective_from = ?")
            .bind(effective_from)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn get_parameter(
        &self,
        key: ParameterKey,
        as_of: NaiveDate,
    ) -> Result<ParameterValue, RepositoryError> {
        // When windows overlap the latest effective_from wins.
        let row = sqlx::query(
            "SELECT value, effective_from, effective_to
             FROM payroll_parameters
             WHERE param_key = ?
               AND effective_from <= ?
               AND (effective_to IS NULL OR effective_to >= ?)
             ORDER BY effective_from DESC
             LIMIT 1",
        )
        .bind(key.as_str())
        .bind(as_of)
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(ParameterValue {
            key,
            value: get_decimal(&row, "value")?,
            effective_from: get_date(&row, "effective_from")?,
            effective_to: get_optional_date(&row, "effective_to")?,
        })
    }

    async fn get_parameters(
        &self,
        as_of: NaiveDate,
    ) -> Result<PayrollParameters, RepositoryError> {
        Ok(PayrollParameters {
            minimum_wage: self.required_value(ParameterKey::MinimumWage, as_of).await?,
            inss_ceiling: self.required_value(ParameterKey::InssCeiling, as_of).await?,
            dependent_deduction: self
                .required_value(ParameterKey::DependentDeduction, as_of)
                .await?,
            consignable_margin_rate: self
                .required_value(ParameterKey::ConsignableMarginRate, as_of)
                .await?,
            employer_inss_rate: self
                .required_value(ParameterKey::EmployerInssRate, as_of)
                .await?,
            rat_rate: self.optional_value(ParameterKey::RatRate, as_of).await?,
            other_entities_rate: self
                .optional_value(ParameterKey::OtherEntitiesRate, as_of)
                .await?,
            remuneration_ceiling: self
                .required_value(ParameterKey::RemunerationCeiling, as_of)
                .await?,
        })
    }

    async fn upsert_parameter(
        &self,
        value: &ParameterValue,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO payroll_parameters (param_key, value, effective_from, effective_to)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (param_key, effective_from)
             DO UPDATE SET value = excluded.value, effective_to = excluded.effective_to",
        )
        .bind(value.key.as_str())
        .bind(decimal_to_f64(value.value))
        .bind(value.effective_from)
        .bind(value.effective_to)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn create_calculation(
        &self,
        calc: NewPayrollCalculation,
    ) -> Result<PayrollCalculation, RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "INSERT INTO payroll_calculations (
                competency_year, competency_month, employee_ref,
                total_proventos, other_deductions, dependent_count,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(calc.competency_year)
        .bind(calc.competency_month)
        .bind(&calc.employee_ref)
        .bind(decimal_to_f64(calc.total_proventos))
        .bind(decimal_to_f64(calc.other_deductions))
        .bind(calc.dependent_count)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_calculation(id).await
    }

    async fn get_calculation(&self, id: i64) -> Result<PayrollCalculation, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {LIST_CALCULATION_COLUMNS} FROM payroll_calculations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_calculation(&row)
    }

    async fn update_calculation(
        &self,
        calc: &PayrollCalculation,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let result = sqlx::query(
            "UPDATE payroll_calculations SET
                competency_year = ?, competency_month = ?, employee_ref = ?,
                total_proventos = ?, other_deductions = ?, dependent_count = ?,
                calculated_inss = ?, calculated_irrf = ?,
                calculated_total_descontos = ?, calculated_net_pay = ?,
                calculated_employer_charges = ?, calculated_consignable_margin = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(calc.competency_year)
        .bind(calc.competency_month)
        .bind(&calc.employee_ref)
        .bind(decimal_to_f64(calc.total_proventos))
        .bind(decimal_to_f64(calc.other_deductions))
        .bind(calc.dependent_count)
        .bind(calc.calculated_inss.map(decimal_to_f64))
        .bind(calc.calculated_irrf.map(decimal_to_f64))
        .bind(calc.calculated_total_descontos.map(decimal_to_f64))
        .bind(calc.calculated_net_pay.map(decimal_to_f64))
        .bind(calc.calculated_employer_charges.map(decimal_to_f64))
        .bind(calc.calculated_consignable_margin.map(decimal_to_f64))
        .bind(&now)
        .bind(calc.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_calculation(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payroll_calculations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_calculations(
        &self,
        competency: Option<(i32, i32)>,
    ) -> Result<Vec<PayrollCalculation>, RepositoryError> {
        let rows = match competency {
            Some((year, month)) => {
                sqlx::query(&format!(
                    "SELECT {LIST_CALCULATION_COLUMNS} FROM payroll_calculations
                     WHERE competency_year = ? AND competency_month = ?
                     ORDER BY updated_at DESC"
                ))
                .bind(year)
                .bind(month)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {LIST_CALCULATION_COLUMNS} FROM payroll_calculations
                     ORDER BY updated_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_calculation).collect()
    }
}
