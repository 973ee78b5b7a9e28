//! Dialect adapter trait and factory for unified database access.
//!
//! Every supported backend implements [`DialectAdapter`]. The three
//! implementations reach their metadata through very different facilities
//! (PRAGMAs, `information_schema` views, `pg_index`) but all of them come out
//! with the same [`TableDescriptor`] shape, and [`introspect`] assembles the
//! [`SchemaModel`] identically for each of them.
//!
//! # Module Structure
//! - `identifiers`: Identifier quoting and the reject policy
//! - `values`: Conversion helpers shared by the per-dialect row decoders
//! - Database-specific modules (sqlite, postgres, mysql)

use crate::config::ManagerConfig;
use crate::models::{
    ColumnDescriptor, Dialect, ForeignKeyDescriptor, SchemaModel, TableDescriptor, TabularResult,
};
use crate::Result;
use async_trait::async_trait;

pub mod identifiers;
pub mod values;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mysql")]
pub mod mysql;

/// Capability contract implemented once per dialect.
///
/// # Object Safety
/// This trait is object-safe; the connection manager only ever holds a
/// `Box<dyn DialectAdapter>` and never names a concrete backend type.
#[async_trait]
pub trait DialectAdapter: Send + Sync {
    /// Returns the dialect this adapter speaks.
    fn dialect(&self) -> Dialect;

    /// Lists user tables in the order the backend reports them.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Describes one table's columns (native ordinal order) and foreign keys.
    async fn describe_table(
        &self,
        table: &str,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<ForeignKeyDescriptor>)>;

    /// Runs a full `COUNT(*)` over the table.
    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Executes arbitrary SQL, fetching at most `max_rows` rows.
    ///
    /// No read-only check happens here; callers go through
    /// [`crate::executor`].
    async fn execute_raw(&self, sql: &str, max_rows: usize) -> Result<TabularResult>;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Opens an adapter for `dialect` against `target`.
///
/// # Arguments
/// * `dialect` - Which backend to open
/// * `target` - File path (SQLite) or connection URI (PostgreSQL/MySQL);
///   credentials in the URI are passed verbatim to the driver
/// * `config` - Session and identifier settings
///
/// # Errors
/// Returns `DriverUnavailable` if the dialect's feature is compiled out,
/// `ConnectionFailure` if the driver cannot connect.
pub async fn open_adapter(
    dialect: Dialect,
    target: &str,
    config: &ManagerConfig,
) -> Result<Box<dyn DialectAdapter>> {
    match dialect {
        #[cfg(feature = "sqlite")]
        Dialect::SQLite => {
            let adapter = sqlite::SqliteAdapter::connect(target, config).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "sqlite"))]
        Dialect::SQLite => Err(crate::error::QueryLensError::driver_unavailable(
            "SQLite", "sqlite",
        )),
        #[cfg(feature = "postgresql")]
        Dialect::PostgreSQL => {
            let adapter = postgres::PostgresAdapter::connect(target, config).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "postgresql"))]
        Dialect::PostgreSQL => Err(crate::error::QueryLensError::driver_unavailable(
            "PostgreSQL",
            "postgresql",
        )),
        #[cfg(feature = "mysql")]
        Dialect::MySQL => {
            let adapter = mysql::MySqlAdapter::connect(target, config).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "mysql"))]
        Dialect::MySQL => Err(crate::error::QueryLensError::driver_unavailable(
            "MySQL", "mysql",
        )),
    }
}

/// Returns whether the driver for `dialect` was compiled into this build.
pub fn is_dialect_available(dialect: Dialect) -> bool {
    match dialect {
        Dialect::SQLite => cfg!(feature = "sqlite"),
        Dialect::PostgreSQL => cfg!(feature = "postgresql"),
        Dialect::MySQL => cfg!(feature = "mysql"),
    }
}

/// Builds the normalized schema model for whatever `adapter` is connected to.
///
/// One `COUNT(*)` is issued per table; on large tables this dominates the
/// cost of introspection, which runs once per connect.
pub async fn introspect(adapter: &dyn DialectAdapter) -> Result<SchemaModel> {
    let start_time = std::time::Instant::now();
    let dialect = adapter.dialect();

    tracing::debug!("Enumerating {} tables", dialect);
    let names = adapter.list_tables().await?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let (columns, foreign_keys) = adapter.describe_table(&name).await?;
        let row_count = adapter.count_rows(&name).await?;

        tracing::debug!(
            "Described table '{}' with {} columns, {} foreign keys, {} rows",
            name,
            columns.len(),
            foreign_keys.len(),
            row_count
        );

        tables.push(TableDescriptor {
            name,
            columns,
            foreign_keys,
            row_count,
        });
    }

    let schema = SchemaModel { dialect, tables };

    tracing::info!(
        "{} introspection completed in {:.2}s - found {} tables, {} rows",
        dialect,
        start_time.elapsed().as_secs_f64(),
        schema.table_count(),
        schema.total_rows()
    );

    Ok(schema)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory adapter used by unit tests of the manager and executor.

    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted adapter that records the SQL it was asked to run.
    #[derive(Clone)]
    pub(crate) struct StubAdapter {
        pub dialect: Dialect,
        pub tables: Vec<TableDescriptor>,
        pub result: TabularResult,
        pub executed: Arc<Mutex<Vec<String>>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl StubAdapter {
        pub(crate) fn new(dialect: Dialect, tables: Vec<TableDescriptor>) -> Self {
            Self {
                dialect,
                tables,
                result: TabularResult::default(),
                executed: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(false)),
            }
        }

        fn find(&self, table: &str) -> Result<&TableDescriptor> {
            self.tables
                .iter()
                .find(|t| t.name == table)
                .ok_or_else(|| crate::error::QueryLensError::ExecutionFailure {
                    context: format!("no such table: {}", table),
                    source: None,
                })
        }
    }

    #[async_trait]
    impl DialectAdapter for StubAdapter {
        fn dialect(&self) -> Dialect {
            self.dialect
        }

        async fn list_tables(&self) -> Result<Vec<String>> {
            Ok(self.tables.iter().map(|t| t.name.clone()).collect())
        }

        async fn describe_table(
            &self,
            table: &str,
        ) -> Result<(Vec<ColumnDescriptor>, Vec<ForeignKeyDescriptor>)> {
            let t = self.find(table)?;
            Ok((t.columns.clone(), t.foreign_keys.clone()))
        }

        async fn count_rows(&self, table: &str) -> Result<u64> {
            Ok(self.find(table)?.row_count)
        }

        async fn execute_raw(&self, sql: &str, max_rows: usize) -> Result<TabularResult> {
            self.executed.lock().unwrap().push(sql.to_string());
            let rows: Vec<_> = self.result.rows.iter().take(max_rows).cloned().collect();
            Ok(TabularResult::from_rows(
                self.result.columns.clone(),
                rows,
                max_rows,
            ))
        }

        async fn close(&self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    pub(crate) fn table(name: &str, rows: u64) -> TableDescriptor {
        TableDescriptor {
            name: name.to_string(),
            columns: vec![ColumnDescriptor {
                name: "id".to_string(),
                data_type: "INTEGER".to_string(),
                nullable: false,
                is_primary_key: true,
                default: None,
            }],
            foreign_keys: vec![],
            row_count: rows,
        }
    }
}
