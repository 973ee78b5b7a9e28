//! Text rendering of query results.

use crate::models::TabularResult;
use serde_json::Value as JsonValue;

/// Renders a scalar the way it appears in tables and chart labels.
///
/// Strings are verbatim, numbers use JSON number formatting, booleans are
/// `true`/`false` and null is `NULL`. Arrays and objects (PostgreSQL/MySQL
/// JSON columns) render as compact JSON.
pub fn display_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Renders a result as a Markdown table.
///
/// A result without columns renders as `Query returned no results.`; a
/// truncated result gets a trailing note with the returned row count.
///
/// # Example
///
/// ```rust
/// use querylens_core::format::format_markdown;
/// use querylens_core::models::TabularResult;
/// use serde_json::json;
///
/// let result = TabularResult::from_rows(
///     vec!["region".to_string(), "total".to_string()],
///     vec![vec![json!("east"), json!(10)]],
///     1000,
/// );
/// assert_eq!(
///     format_markdown(&result),
///     "| region | total |\n| --- | --- |\n| east | 10 |"
/// );
/// ```
pub fn format_markdown(result: &TabularResult) -> String {
    if result.columns.is_empty() {
        return "Query returned no results.".to_string();
    }

    let mut lines = Vec::with_capacity(result.rows.len() + 2);
    lines.push(markdown_row(result.columns.iter().map(|c| escape_cell(c))));
    lines.push(markdown_row(result.columns.iter().map(|_| "---".to_string())));
    for row in &result.rows {
        lines.push(markdown_row(
            row.iter().map(|value| escape_cell(&display_scalar(value))),
        ));
    }

    let mut table = lines.join("\n");
    if result.truncated {
        table.push_str(&format!(
            "\n\n*Results truncated to {} rows.*",
            result.row_count
        ));
    }
    table
}

fn markdown_row(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}
