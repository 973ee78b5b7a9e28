//! Read-only query execution with a bounded result size.
//!
//! # Write Check
//! Only the first whitespace-delimited token of the trimmed, upper-cased
//! query is compared against [`WRITE_KEYWORDS`]. The check is lexical: a
//! write wrapped in a CTE (`WITH x AS (DELETE ...)`), a procedure call or a
//! second statement after `;` is not detected. The read-only session opened
//! by the adapters is the backstop for those cases.

use crate::adapters::DialectAdapter;
use crate::models::TabularResult;
use crate::{Result, error::QueryLensError};

/// Leading keywords that mark a statement as a write.
pub const WRITE_KEYWORDS: [&str; 9] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "REPLACE", "MERGE",
];

/// Rejects queries whose first token is a write keyword.
///
/// # Errors
/// Returns `WriteOperationRejected` naming the matched keyword.
///
/// # Example
///
/// ```rust
/// use querylens_core::executor::check_read_only;
///
/// assert!(check_read_only("  select * from orders").is_ok());
/// assert!(check_read_only("delete from orders").is_err());
/// ```
pub fn check_read_only(sql: &str) -> Result<()> {
    let first_token = sql
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase();

    if let Some(keyword) = WRITE_KEYWORDS.iter().find(|k| **k == first_token) {
        tracing::warn!("Rejected write operation: {}", keyword);
        return Err(QueryLensError::WriteOperationRejected {
            keyword: (*keyword).to_string(),
        });
    }

    Ok(())
}

/// Executes `sql` through `adapter` after the write check.
///
/// At most `max_rows` rows are fetched; `truncated` is set when that many
/// came back.
///
/// # Errors
/// Returns `WriteOperationRejected` for write statements and
/// `ExecutionFailure` when the backend fails on the query.
pub async fn execute(
    adapter: &dyn DialectAdapter,
    sql: &str,
    max_rows: usize,
) -> Result<TabularResult> {
    check_read_only(sql)?;

    let start_time = std::time::Instant::now();
    let result = adapter
        .execute_raw(sql, max_rows)
        .await
        .map_err(|e| match e {
            QueryLensError::ExecutionFailure { .. } => e,
            other => QueryLensError::ExecutionFailure {
                context: other.to_string(),
                source: Some(Box::new(other)),
            },
        })?;

    tracing::debug!(
        "Executed {} query ({} chars) in {:.3}s: {} rows, truncated={}",
        adapter.dialect(),
        sql.len(),
        start_time.elapsed().as_secs_f64(),
        result.row_count,
        result.truncated
    );

    Ok(result)
}
