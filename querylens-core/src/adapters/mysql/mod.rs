//! MySQL dialect adapter.
//!
//! # Module Structure
//! - `connection`: Target normalization and session settings
//! - `introspection`: `INFORMATION_SCHEMA` metadata queries
//! - `query`: Bounded execution and value decoding
//!
//! Introspection is scoped to the database named in the target
//! (`DATABASE()`); a target without one describes no tables.

pub mod connection;
pub mod introspection;
pub mod query;

use crate::Result;
use crate::adapters::DialectAdapter;
use crate::config::IdentifierPolicy;
use crate::models::{ColumnDescriptor, Dialect, ForeignKeyDescriptor, TabularResult};
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use connection::normalize_target;

/// MySQL adapter over a single-connection pool.
pub struct MySqlAdapter {
    pub pool: MySqlPool,
    pub identifier_policy: IdentifierPolicy,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("identifier_policy", &self.identifier_policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DialectAdapter for MySqlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        introspection::list_tables(self).await
    }

    async fn describe_table(
        &self,
        table: &str,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<ForeignKeyDescriptor>)> {
        let table = crate::adapters::identifiers::prepare_identifier(table, self.identifier_policy)?;
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
