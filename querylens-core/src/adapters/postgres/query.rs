//! Bounded query execution against PostgreSQL.

use crate::adapters::values;
use crate::models::TabularResult;
use crate::{Result, error::QueryLensError};
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{Column, Executor, PgPool, Row, Statement, TypeInfo};

/// Runs `sql` and fetches at most `max_rows` rows.
pub(crate) async fn execute(pool: &PgPool, sql: &str, max_rows: usize) -> Result<TabularResult> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    {
        let mut stream = sqlx::query(sql).fetch(pool);
        while rows.len() < max_rows {
            let Some(row) = stream
                .try_next()
                .await
                .map_err(QueryLensError::execution_failed)?
            else {
                break;
            };

            if columns.is_none() {
                columns = Some(
                    row.columns()
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect(),
                );
            }
            rows.push((0..row.len()).map(|i| extract_column_value(&row, i)).collect());
        }
    }

    let columns = match columns {
        Some(columns) => columns,
        None => match pool.prepare(sql).await {
            Ok(statement) => statement
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            Err(e) => {
                tracing::debug!("Could not describe result columns: {}", e);
                Vec::new()
            }
        },
    };

    Ok(TabularResult::from_rows(columns, rows, max_rows))
}

/// Extracts a column value as a JSON scalar.
///
/// PostgreSQL types are matched strictly by OID, so each probe only succeeds
/// for its own family of column types. Types with no probe (intervals,
/// network addresses, arrays) render as their type name in angle brackets.
fn extract_column_value(row: &PgRow, index: usize) -> JsonValue {
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return values::nullable(value, JsonValue::Bool);
    }

    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return values::nullable(value, |v| values::integer(i64::from(v)));
    }

    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return values::nullable(value, |v| values::integer(i64::from(v)));
    }

    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return values::nullable(value, values::integer);
    }

    if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
        return values::nullable(value, |v| values::float(f64::from(v)));
    }

    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return values::nullable(value, values::float);
    }

    if let Ok(value) = row.try_get::<Option<rust_decimal::Decimal>, _>(index) {
        return values::nullable(value, values::decimal);
    }

    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return values::nullable(value, values::text);
    }

    if let Ok(value) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return values::nullable(value, values::display);
    }

    if let Ok(value) = row.try_get::<Option<chrono::NaiveTime>, _>(index) {
        return values::nullable(value, values::display);
    }

    if let Ok(value) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return values::nullable(value, values::display);
    }

    if let Ok(value) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return values::nullable(value, |v| values::text(v.to_rfc3339()));
    }

    if let Ok(value) = row.try_get::<Option<uuid::Uuid>, _>(index) {
        return values::nullable(value, values::display);
    }

    if let Ok(value) = row.try_get::<Option<JsonValue>, _>(index) {
        return value.unwrap_or(JsonValue::Null);
    }

    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return values::nullable(value, values::bytes);
    }

    let type_name = row.columns()[index].type_info().name().to_string();
    tracing::debug!("No decoder for PostgreSQL type {}", type_name);
    JsonValue::String(format!("<{}>", type_name))
}
