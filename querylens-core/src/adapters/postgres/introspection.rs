//! PostgreSQL schema introspection.
//!
//! Catalog names are cast to `text` in every query: `information_schema`
//! exposes them as `sql_identifier`, which the driver refuses to decode as a
//! `String`.

use super::{DEFAULT_SCHEMA, PostgresAdapter};
use crate::adapters::identifiers::{prepare_identifier, quote_ansi};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor};
use crate::{Result, error::QueryLensError};
use sqlx::Row;

pub(crate) async fn list_tables(adapter: &PostgresAdapter) -> Result<Vec<String>> {
    let tables_query = r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = $1
        AND table_type = 'BASE TABLE'
        ORDER BY table_name
    "#;

    let rows = sqlx::query(tables_query)
        .bind(DEFAULT_SCHEMA)
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

/// Columns in ordinal order. `is_primary_key` is filled in by the caller.
pub(crate) async fn collect_columns(
    adapter: &PostgresAdapter,
    table: &str,
) -> Result<Vec<ColumnDescriptor>> {
    let columns_query = r#"
        SELECT
            column_name::text AS column_name,
            data_type::text AS data_type,
            is_nullable::text AS is_nullable,
            column_default::text AS column_default
        FROM information_schema.columns
        WHERE table_schema = $1
        AND table_name::text = $2
        ORDER BY ordinal_position
    "#;

    let rows = sqlx::query(columns_query)
        .bind(DEFAULT_SCHEMA)
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
        let data_type: String = row.try_get("data_type").unwrap_or_default();
        let is_nullable: String = row
            .try_get("is_nullable")
            .unwrap_or_else(|_| "YES".to_string());
        let default: Option<String> = row.try_get("column_default").unwrap_or(None);

        columns.push(ColumnDescriptor {
            name,
            data_type,
            nullable: is_nullable.eq_ignore_ascii_case("YES"),
            is_primary_key: false,
            default,
        });
    }

    Ok(columns)
}

/// Names of the table's primary key columns, from `pg_index`.
pub(crate) async fn collect_primary_key(
    adapter: &PostgresAdapter,
    table: &str,
) -> Result<Vec<String>> {
    let pk_query = r#"
        SELECT a.attname::text AS column_name
        FROM pg_index i
        JOIN pg_attribute a
            ON a.attrelid = i.indrelid
            AND a.attnum = ANY(i.indkey)
        WHERE i.indrelid = format('%I.%I', $1::text, $2::text)::regclass
        AND i.indisprimary
        ORDER BY array_position(i.indkey::int2[], a.attnum)
    "#;

    let rows = sqlx::query(pk_query)
        .bind(DEFAULT_SCHEMA)
        .bind(table)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to collect primary key for table '{}'", table),
                e,
            )
        })?;

    Ok(rows
        .iter()
        .filter_map(|row| row.try_get::<String, _>("column_name").ok())
        .collect())
}

/// Foreign keys from `pg_constraint`, one entry per referencing column.
///
/// `conkey` and `confkey` are unnested in lockstep so composite keys pair
/// each local column with its matching referenced column.
pub(crate) async fn collect_foreign_keys(
    adapter: &PostgresAdapter,
    table: &str,
) -> Result<Vec<ForeignKeyDescriptor>> {
    let fk_query = r#"
        SELECT
            a.attname::text AS column_name,
            ref_class.relname::text AS references_table,
            ref_attr.attname::text AS references_column
        FROM pg_constraint c
        CROSS JOIN LATERAL unnest(c.conkey, c.confkey)
            WITH ORDINALITY AS k(attnum, ref_attnum, position)
        JOIN pg_attribute a
            ON a.attrelid = c.conrelid
            AND a.attnum = k.attnum
        JOIN pg_attribute ref_attr
            ON ref_attr.attrelid = c.confrelid
            AND ref_attr.attnum = k.ref_attnum
        JOIN pg_class ref_class
            ON ref_class.oid = c.confrelid
        WHERE c.contype = 'f'
        AND c.conrelid = format('%I.%I', $1::text, $2::text)::regclass
        ORDER BY c.conname, k.position
    "#;

    let rows = sqlx::query(fk_query)
        .bind(DEFAULT_SCHEMA)
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

pub(crate) async fn count_rows(adapter: &PostgresAdapter, table: &str) -> Result<u64> {
    let table = prepare_identifier(table, adapter.identifier_policy)?;
    let query = format!(
        "SELECT COUNT(*) FROM {}.{}",
        quote_ansi(DEFAULT_SCHEMA),
        quote_ansi(table)
    );

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
