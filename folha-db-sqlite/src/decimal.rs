//! Column accessors bridging SQLite's loose typing and the strongly-typed
//! models. Money and rate columns are stored as REAL but may come back as
//! INTEGER for whole values, so reads are dispatched on the value's actual
//! SQLite type.

use folha_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row, handling both INTEGER and REAL SQLite types.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Get an optional decimal value from a row, returning None for NULL values.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Convert a Decimal to f64 for SQLite storage.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        sqlx::query(
            "CREATE TABLE bracket_values (
                id INTEGER PRIMARY KEY,
                whole_value INTEGER,
                rate_value REAL,
                upper_value REAL,
                label TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");

        sqlx::query(
            "INSERT INTO bracket_values (id, whole_value, rate_value, upper_value, label)
             VALUES (1, 1518, 7.5, NULL, 'faixa 1')",
        )
        .execute(&pool)
        .await
        .expect("Failed to insert test data");

        pool
    }

    async fn fetch_row(pool: &sqlx::sqlite::SqlitePool) -> sqlx::sqlite::SqliteRow {
        sqlx::query("SELECT whole_value, rate_value, upper_value, label FROM bracket_values")
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    #[tokio::test]
    async fn get_decimal_reads_integer_columns() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        assert_eq!(get_decimal(&row, "whole_value"), Ok(dec!(1518)));
    }

    #[tokio::test]
    async fn get_decimal_reads_real_columns() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        assert_eq!(get_decimal(&row, "rate_value"), Ok(dec!(7.5)));
    }

    #[tokio::test]
    async fn get_decimal_treats_null_as_zero() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        assert_eq!(get_decimal(&row, "upper_value"), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn get_decimal_rejects_text_columns() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        assert_eq!(
            get_decimal(&row, "label"),
            Err(RepositoryError::Database(
                "Unexpected type 'TEXT' for column 'label'".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn get_decimal_reports_missing_columns() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        let result = get_decimal(&row, "nonexistent");

        assert!(
            matches!(result, Err(RepositoryError::Database(ref msg))
                if msg.starts_with("Column 'nonexistent' not found:"))
        );
    }

    #[tokio::test]
    async fn get_optional_decimal_distinguishes_null_from_zero() {
        let pool = setup_test_db().await;
        let row = fetch_row(&pool).await;

        assert_eq!(get_optional_decimal(&row, "upper_value"), Ok(None));
        assert_eq!(
            get_optional_decimal(&row, "rate_value"),
            Ok(Some(dec!(7.5)))
        );
    }

    #[test]
    fn decimal_to_f64_round_trips_money_values() {
        assert_eq!(decimal_to_f64(dec!(8157.41)), 8157.41);
        assert_eq!(decimal_to_f64(dec!(-189.59)), -189.59);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }
}
