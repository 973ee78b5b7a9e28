//! SQLite dialect adapter.
//!
//! # Module Structure
//! - `connection`: Target normalization and opening the single connection
//! - `introspection`: Tables, columns and foreign keys via `sqlite_master` and PRAGMAs
//! - `query`: Bounded execution of arbitrary SQL and row decoding
//!
//! # SQLite-Specific Behaviour
//! - Primary keys come inline from `PRAGMA table_info` (`pk > 0`)
//! - Foreign keys come from `PRAGMA foreign_key_list`
//! - Supports file-based and in-memory databases
//! - Opened read-only unless the manager config says otherwise

pub mod connection;
pub mod introspection;
pub mod query;

use crate::Result;
use crate::adapters::DialectAdapter;
use crate::config::IdentifierPolicy;
use crate::models::{ColumnDescriptor, Dialect, ForeignKeyDescriptor, TabularResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use connection::normalize_target;

/// SQLite adapter over a single-connection pool.
pub struct SqliteAdapter {
    /// Connection pool capped at one connection
    pub pool: SqlitePool,
    /// Policy applied to table names spliced into PRAGMAs and counts
    pub identifier_policy: IdentifierPolicy,
    in_memory: bool,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("identifier_policy", &self.identifier_policy)
            .field("is_in_memory", &self.in_memory)
            .finish_non_exhaustive()
    }
}

impl SqliteAdapter {
    /// Checks if the connection is to an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }
}

#[async_trait]
impl DialectAdapter for SqliteAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        introspection::list_tables(self).await
    }

    async fn describe_table(
        &self,
        table: &str,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<ForeignKeyDescriptor>)> {
        let columns = introspection::collect_columns(self, table).await?;
        let foreign_keys = introspection::collect_foreign_keys(self, table).await?;
        Ok((columns, foreign_keys))
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        introspection::count_rows(self, table).await
    }

    async fn execute_raw(&self, sql: &str, max_rows: usize) -> Result<TabularResult> {
        query::execute(&self.pool, sql, max_rows).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
