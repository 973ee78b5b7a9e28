//! SQLite schema introspection.
//!
//! # SQLite System Tables
//! - `sqlite_master`: table enumeration
//! - `PRAGMA table_info()`: columns, declared types, nullability and inline `pk` ordinal
//! - `PRAGMA foreign_key_list()`: one row per (constraint, column) pair

use super::SqliteAdapter;
use crate::adapters::identifiers::{prepare_identifier, quote_ansi, quote_literal};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor};
use crate::{Result, error::QueryLensError};
use sqlx::Row;

/// Lists user tables, skipping SQLite's internal `sqlite_*` tables.
pub(crate) async fn list_tables(adapter: &SqliteAdapter) -> Result<Vec<String>> {
    let tables_query = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
        AND name NOT LIKE 'sqlite_%'
        ORDER BY name
    "#;

    let rows = sqlx::query(tables_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| QueryLensError::introspection_failed("Failed to enumerate tables", e))?;

    rows.iter()
        .map(|row| {
            row.try_get::<String, _>("name")
                .map_err(|e| QueryLensError::introspection_failed("Failed to parse table name", e))
        })
        .collect()
}

/// Collects column metadata for a table in `cid` order.
pub(crate) async fn collect_columns(
    adapter: &SqliteAdapter,
    table: &str,
) -> Result<Vec<ColumnDescriptor>> {
    let table = prepare_identifier(table, adapter.identifier_policy)?;
    let columns_query = format!("PRAGMA table_info({})", quote_literal(table));

    let rows = sqlx::query(&columns_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to collect columns for table '{}'", table),
                e,
            )
        })?;

    let mut columns: Vec<(i64, ColumnDescriptor)> = Vec::with_capacity(rows.len());

    for row in &rows {
        let cid: i64 = row.try_get("cid").unwrap_or(0);
        let name: String = row.try_get("name").map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to parse column name for table '{}'", table),
                e,
            )
        })?;
        let data_type: String = row.try_get("type").unwrap_or_default();
        let notnull: i64 = row.try_get("notnull").unwrap_or(0);
        let default: Option<String> = row.try_get("dflt_value").unwrap_or(None);
        let pk: i64 = row.try_get("pk").unwrap_or(0);

        columns.push((
            cid,
            ColumnDescriptor {
                name,
                data_type,
                nullable: notnull == 0,
                is_primary_key: pk > 0,
                default,
            },
        ));
    }

    columns.sort_by_key(|(cid, _)| *cid);
    Ok(columns.into_iter().map(|(_, column)| column).collect())
}

/// Primary key columns of `table`, ordered by their position in the key.
async fn primary_key_columns(adapter: &SqliteAdapter, table: &str) -> Result<Vec<String>> {
    let query = format!("PRAGMA table_info({})", quote_literal(table));
    let rows = sqlx::query(&query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to read primary key of table '{}'", table),
                e,
            )
        })?;

    let mut pk_columns: Vec<(i64, String)> = rows
        .iter()
        .filter_map(|row| {
            let pk: i64 = row.try_get("pk").unwrap_or(0);
            (pk > 0).then(|| (pk, row.try_get("name").unwrap_or_default()))
        })
        .collect();
    pk_columns.sort_by_key(|(pk, _)| *pk);

    Ok(pk_columns.into_iter().map(|(_, name)| name).collect())
}

/// Collects foreign keys, flattening composite keys into per-column triples.
///
/// A reference declared without a column list (`REFERENCES parent`) reports
/// a NULL `to`; it targets the parent's primary key, which is looked up.
pub(crate) async fn collect_foreign_keys(
    adapter: &SqliteAdapter,
    table: &str,
) -> Result<Vec<ForeignKeyDescriptor>> {
    let table = prepare_identifier(table, adapter.identifier_policy)?;
    let fk_query = format!("PRAGMA foreign_key_list({})", quote_literal(table));

    let rows = sqlx::query(&fk_query)
        .fetch_all(&adapter.pool)
        .await
        .map_err(|e| {
            QueryLensError::introspection_failed(
                format!("Failed to collect foreign keys for table '{}'", table),
                e,
            )
        })?;

    let mut entries: Vec<(i64, i64, String, String, Option<String>)> = rows
        .iter()
        .map(|row| {
            (
                row.try_get("id").unwrap_or(0),
                row.try_get("seq").unwrap_or(0),
                row.try_get("table").unwrap_or_default(),
                row.try_get("from").unwrap_or_default(),
                row.try_get("to").unwrap_or(None),
            )
        })
        .collect();
    entries.sort_by_key(|(id, seq, ..)| (*id, *seq));

    let mut foreign_keys = Vec::with_capacity(entries.len());
    for (_, seq, references_table, column, to) in entries {
        let references_column = match to {
            Some(to) => to,
            None => primary_key_columns(adapter, &references_table)
                .await?
                .into_iter()
                .nth(usize::try_from(seq).unwrap_or(0))
                .unwrap_or_default(),
        };

        foreign_keys.push(ForeignKeyDescriptor {
            column,
            references_table,
            references_column,
        });
    }

    Ok(foreign_keys)
}

/// Counts every row of the table.
pub(crate) async fn count_rows(adapter: &SqliteAdapter, table: &str) -> Result<u64> {
    let table = prepare_identifier(table, adapter.identifier_policy)?;
    let query = format!("SELECT COUNT(*) FROM {}", quote_ansi(table));

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
