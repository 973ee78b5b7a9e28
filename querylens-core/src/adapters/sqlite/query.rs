//! Bounded query execution against SQLite.

use crate::adapters::values;
use crate::models::TabularResult;
use crate::{Result, error::QueryLensError};
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, Statement};

/// Runs `sql` and fetches at most `max_rows` rows.
///
/// Rows are pulled one at a time from the driver's stream and the stream is
/// dropped once the cap is reached, so a huge result is never materialized.
///
/// SQLite runs every statement of a `;`-separated batch. Every row must have
/// the same columns as the first one; a batch whose statements return
/// differently shaped rows fails with `ExecutionFailure`.
pub(crate) async fn execute(pool: &SqlitePool, sql: &str, max_rows: usize) -> Result<TabularResult> {
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

            if let Some(expected) = &columns {
                if !has_columns(&row, expected) {
                    return Err(QueryLensError::ExecutionFailure {
                        context: format!(
                            "statements returned rows with different columns ([{}] then [{}]); \
                             run one statement at a time",
                            expected.join(", "),
                            column_names(&row).join(", ")
                        ),
                        source: None,
                    });
                }
            } else {
                columns = Some(column_names(&row));
            }
            rows.push(row_to_values(&row));
        }
    }

    let columns = match columns {
        Some(columns) => columns,
        None => describe_columns(pool, sql).await,
    };

    Ok(TabularResult::from_rows(columns, rows, max_rows))
}

fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

fn has_columns(row: &SqliteRow, expected: &[String]) -> bool {
    row.columns().len() == expected.len()
        && row
            .columns()
            .iter()
            .zip(expected)
            .all(|(column, name)| column.name() == name)
}

/// Column names for a statement that produced no rows.
async fn describe_columns(pool: &SqlitePool, sql: &str) -> Vec<String> {
    match pool.prepare(sql).await {
        Ok(statement) => statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
        Err(e) => {
            tracing::debug!("Could not describe result columns: {}", e);
            Vec::new()
        }
    }
}

fn row_to_values(row: &SqliteRow) -> Vec<JsonValue> {
    (0..row.len())
        .map(|index| extract_column_value(row, index))
        .collect()
}

/// Extracts a column value as a JSON scalar.
///
/// SQLite is dynamically typed; the storage class of each value decides
/// which probe succeeds.
fn extract_column_value(row: &SqliteRow, index: usize) -> JsonValue {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return values::nullable(value, values::text);
    }

    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return values::nullable(value, values::integer);
    }

    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return values::nullable(value, values::float);
    }

    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return values::nullable(value, JsonValue::Bool);
    }

    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return values::nullable(value, values::bytes);
    }

    JsonValue::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_select_literal() {
        let pool = memory_pool().await;
        let result = execute(&pool, "SELECT 1", 1000).await.unwrap();

        assert_eq!(result.columns, vec!["1"]);
        assert_eq!(result.rows, vec![vec![json!(1)]]);
        assert_eq!(result.row_count, 1);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_storage_classes() {
        let pool = memory_pool().await;
        let result = execute(
            &pool,
            "SELECT 'east' AS region, 42 AS qty, 2.5 AS price, NULL AS note, x'DEADBEEF' AS raw",
            10,
        )
        .await
        .unwrap();

        assert_eq!(result.columns, vec!["region", "qty", "price", "note", "raw"]);
        assert_eq!(
            result.rows[0],
            vec![
                json!("east"),
                json!(42),
                json!(2.5),
                JsonValue::Null,
                json!("base64:3q2+7w==")
            ]
        );
    }

    #[tokio::test]
    async fn test_row_cap_marks_truncation() {
        let pool = memory_pool().await;
        let sql = "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 10) \
                   SELECT i FROM n";

        let capped = execute(&pool, sql, 5).await.unwrap();
        assert_eq!(capped.row_count, 5);
        assert!(capped.truncated);

        let full = execute(&pool, sql, 100).await.unwrap();
        assert_eq!(full.row_count, 10);
        assert!(!full.truncated);
    }

    #[tokio::test]
    async fn test_empty_result_keeps_column_names() {
        let pool = memory_pool().await;
        let result = execute(&pool, "SELECT 1 AS a, 2 AS b WHERE 0", 10)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["a", "b"]);
        assert!(result.rows.is_empty());
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_batch_with_mismatched_columns_is_rejected() {
        let pool = memory_pool().await;
        let err = execute(&pool, "SELECT 1 AS a; SELECT 2 AS b, 3 AS c", 10)
            .await
            .unwrap_err();

        assert!(matches!(err, QueryLensError::ExecutionFailure { .. }));
        assert!(err.to_string().contains("one statement at a time"));
    }

    #[tokio::test]
    async fn test_batch_with_same_columns_keeps_row_shape() {
        let pool = memory_pool().await;
        let result = execute(&pool, "SELECT 1 AS a; SELECT 2 AS a", 10)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["a"]);
        assert_eq!(result.rows, vec![vec![json!(1)], vec![json!(2)]]);
        assert!(result.rows.iter().all(|row| row.len() == result.columns.len()));
    }

    #[tokio::test]
    async fn test_invalid_sql_is_execution_failure() {
        let pool = memory_pool().await;
        let err = execute(&pool, "SELECT * FROM missing_table", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryLensError::ExecutionFailure { .. }));
    }
}
