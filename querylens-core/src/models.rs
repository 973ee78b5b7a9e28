//! Core data models shared by every dialect.
//!
//! This module defines the normalized schema model produced by introspection
//! and the tabular result produced by query execution. All models are
//! serializable so embedding front ends can hand them out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::Write as _;
use std::str::FromStr;

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    SQLite,
    PostgreSQL,
    MySQL,
}

impl Dialect {
    /// All dialects in the order they are documented.
    pub const ALL: [Dialect; 3] = [Dialect::SQLite, Dialect::PostgreSQL, Dialect::MySQL];

    /// Canonical lowercase tag (`sqlite`, `postgresql`, `mysql`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
        }
    }

    /// Cargo feature that compiles this dialect's driver in.
    pub fn feature(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = crate::error::QueryLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Dialect::SQLite),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            "mysql" => Ok(Dialect::MySQL),
            _ => Err(crate::error::QueryLensError::unsupported_dialect(s.trim())),
        }
    }
}

/// Column metadata, identical in shape for every dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type exactly as the backend reports it
    pub data_type: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub default: Option<String>,
}

/// A single-column foreign key reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// Table metadata with columns in native ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    /// `COUNT(*)` taken at introspection time
    pub row_count: u64,
}

impl TableDescriptor {
    /// Names of the columns flagged as primary key, in ordinal order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Looks up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Normalized description of a connected database.
///
/// Tables keep the order in which the backend listed them; names are unique
/// and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub dialect: Dialect,
    pub tables: Vec<TableDescriptor>,
}

impl SchemaModel {
    /// Looks up a table by exact name.
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in listing order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Number of tables introspected.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Sum of the row counts of every table.
    pub fn total_rows(&self) -> u64 {
        self.tables
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(t.row_count))
    }

    /// Renders the schema as the plain-text context handed to SQL generation.
    ///
    /// ```text
    /// Database Type: sqlite
    ///
    /// Table: orders (42 rows)
    /// --------------------------------------------------
    ///   id: INTEGER NOT NULL [PRIMARY KEY]
    ///   customer_id: INTEGER NULL
    ///   Foreign Keys:
    ///     customer_id → customers.id
    /// ```
    pub fn description(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Database Type: {}", self.dialect);
        out.push('\n');

        for table in &self.tables {
            let _ = writeln!(out, "Table: {} ({} rows)", table.name, table.row_count);
            out.push_str(&"-".repeat(50));
            out.push('\n');

            for column in &table.columns {
                let nullable = if column.nullable { " NULL" } else { " NOT NULL" };
                let pk = if column.is_primary_key {
                    " [PRIMARY KEY]"
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "  {}: {}{}{}",
                    column.name, column.data_type, nullable, pk
                );
            }

            if !table.foreign_keys.is_empty() {
                out.push_str("  Foreign Keys:\n");
                for fk in &table.foreign_keys {
                    let _ = writeln!(
                        out,
                        "    {} → {}.{}",
                        fk.column, fk.references_table, fk.references_column
                    );
                }
            }
            out.push('\n');
        }

        // Trailing blank line of the last table is not part of the text
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

/// Rows returned by a query, bounded by the caller's row cap.
///
/// Each row holds exactly `columns.len()` JSON scalars (string, number,
/// boolean or null).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
    pub row_count: usize,
    /// Set when the row cap was reached; more rows may exist upstream
    pub truncated: bool,
}

impl TabularResult {
    /// Builds a result from fetched rows, deriving `row_count` and `truncated`.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<JsonValue>>, max_rows: usize) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            truncated: row_count >= max_rows,
        }
    }

    /// Index of a column by exact name (first match).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// True when no rows were returned.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> SchemaModel {
        SchemaModel {
            dialect: Dialect::SQLite,
            tables: vec![
                TableDescriptor {
                    name: "customers".to_string(),
                    columns: vec![
                        ColumnDescriptor {
                            name: "id".to_string(),
                            data_type: "INTEGER".to_string(),
                            nullable: false,
                            is_primary_key: true,
                            default: None,
                        },
                        ColumnDescriptor {
                            name: "name".to_string(),
                            data_type: "TEXT".to_string(),
                            nullable: true,
                            is_primary_key: false,
                            default: None,
                        },
                    ],
                    foreign_keys: vec![],
                    row_count: 3,
                },
                TableDescriptor {
                    name: "orders".to_string(),
                    columns: vec![ColumnDescriptor {
                        name: "customer_id".to_string(),
                        data_type: "INTEGER".to_string(),
                        nullable: false,
                        is_primary_key: false,
                        default: Some("0".to_string()),
                    }],
                    foreign_keys: vec![ForeignKeyDescriptor {
                        column: "customer_id".to_string(),
                        references_table: "customers".to_string(),
                        references_column: "id".to_string(),
                    }],
                    row_count: 7,
                },
            ],
        }
    }

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::SQLite);
        assert_eq!(" PostgreSQL ".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySQL);

        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(
            err,
            crate::error::QueryLensError::UnsupportedDialect { ref dialect } if dialect == "oracle"
        ));
    }

    #[test]
    fn test_dialect_display_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_schema_description() {
        let text = sample_schema().description();
        let expected = "Database Type: sqlite\n\
            \n\
            Table: customers (3 rows)\n\
            --------------------------------------------------\n\
            \x20 id: INTEGER NOT NULL [PRIMARY KEY]\n\
            \x20 name: TEXT NULL\n\
            \n\
            Table: orders (7 rows)\n\
            --------------------------------------------------\n\
            \x20 customer_id: INTEGER NOT NULL\n\
            \x20 Foreign Keys:\n\
            \x20   customer_id → customers.id";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_schema_summaries() {
        let schema = sample_schema();
        assert_eq!(schema.table_count(), 2);
        assert_eq!(schema.total_rows(), 10);
        assert_eq!(schema.table_names(), vec!["customers", "orders"]);
        assert_eq!(
            schema.table("customers").unwrap().primary_key_columns(),
            vec!["id"]
        );
        assert!(schema.table("Customers").is_none());
    }

    #[test]
    fn test_tabular_result_truncation_flag() {
        let rows = vec![vec![json!(1)], vec![json!(2)]];
        let result = TabularResult::from_rows(vec!["n".to_string()], rows.clone(), 2);
        assert_eq!(result.row_count, 2);
        assert!(result.truncated);

        let result = TabularResult::from_rows(vec!["n".to_string()], rows, 5);
        assert!(!result.truncated);
        assert_eq!(result.column_index("n"), Some(0));
    }
}
