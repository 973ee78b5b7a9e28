//! MySQL schema introspection.
//!
//! `INFORMATION_SCHEMA` columns are `CAST(... AS CHAR)` because some server
//! versions report them as binary strings, which do not decode as `String`.

use super::MySqlAdapter;
use crate::adapters::identifiers::{prepare_identifier, quote_backtick};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor};
use crate::{Result, error::QueryLensError};
use sqlx::Row;

pub(crate) async fn list_tables(adapter: &MySqlAdapter) -> Result<Vec<String>> {
    let tables_query = r#"
        SELECT CAST(TABLE_NAME AS CHAR) AS table_name
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
    "#;

    let rows = sqlx::query(tables_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| QueryLensError::introspection_failed("Failed to enumerate tables", e))?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("table_name")
                .map_err(|e| QueryLensError::introspection_failed("Failed to parse table name", e))
        })
        .collect()
}

/// Columns in ordinal order, with the full `COLUMN_TYPE` (e.g. `varchar(255)`)
/// and the primary key flag taken from `COLUMN_KEY`.
pub(crate) async fn collect_columns(
    adapter: &MySqlAdapter,
    table: &str,
) -> Result<Vec<ColumnDescriptor>> {
    let columns_query = r#"
        SELECT
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(COLUMN_TYPE AS CHAR) AS column_type,
            CAST(IS_NULLABLE AS CHAR) AS is_nullable,
            CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
            CAST(COLUMN_KEY AS CHAR) AS column_key
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
    "#;

    let rows = sqlx::query(columns_query)
        .bind(table)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to collect columns for table '{}'", table),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.try_get("column_name").map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to parse column name for table '{}'", table),
                e,
            )
        })?;
        let data_type: String = row.try_get("column_type").unwrap_or_default();
        let is_nullable: String = row
            .try_get("is_nullable")
            .unwrap_or_else(|_| "YES".to_string());
        let default: Option<String> = row.try_get("column_default").unwrap_or(None);
        let column_key: Option<String> = row.try_get("column_key").unwrap_or(None);

        columns.push(ColumnDescriptor {
            name,
            data_type,
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key: column_key.as_deref() == Some("PRI"),
            default,
        });
    }

    Ok(columns)
}

pub(crate) async fn collect_foreign_keys(
    adapter: &MySqlAdapter,
    table: &str,
) -> Result<Vec<ForeignKeyDescriptor>> {
    let fk_query = r#"
        SELECT
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(REFERENCED_TABLE_NAME AS CHAR) AS references_table,
            CAST(REFERENCED_COLUMN_NAME AS CHAR) AS references_column
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        AND REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
    "#;

    let rows = sqlx::query(fk_query)
        .bind(table)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to collect foreign keys for table '{}'", table),
                e,
            )
        })?;

    rows.iter()
        .map(|row| {
            Ok(ForeignKeyDescriptor {
                column: row.try_get("column_name").map_err(|e| {
                    QueryLensError::introspection_failed("Failed to parse foreign key column", e)
                })?,
                references_table: row.try_get("references_table").map_err(|e| {
                    QueryLensError::introspection_failed("Failed to parse referenced table", e)
                })?,
                references_column: row.try_get("references_column").map_err(|e| {
                    QueryLensError::introspection_failed("Failed to parse referenced column", e)
                })?,
            })
        })
        .collect()
}

pub(crate) async fn count_rows(adapter: &MySqlAdapter, table: &str) -> Result<u64> {
    let table = prepare_identifier(table, adapter.identifier_policy)?;
    let query = format!("SELECT COUNT(*) FROM {}", quote_backtick(table));

    let count: i64 = sqlx::query_scalar(&query)
        .fetch_one(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to get row count for table '{}'", table),
                e,
            )
        })?;

    Ok(u64::try_from(count).unwrap_or(0))
}
