//! PostgreSQL dialect adapter.
//!
//! # Module Structure
//! - `connection`: Target parsing (URL or keyword DSN) and session settings
//! - `introspection`: `information_schema` and `pg_catalog` metadata queries
//! - `query`: Bounded execution and OID-driven value decoding
//!
//! Only the `public` schema is described.

pub mod connection;
pub mod introspection;
pub mod query;

use crate::Result;
use crate::adapters::DialectAdapter;
use crate::config::IdentifierPolicy;
use crate::models::{ColumnDescriptor, Dialect, ForeignKeyDescriptor, TabularResult};
use async_trait::async_trait;
use sqlx::PgPool;

/// Schema that introspection is scoped to.
pub const DEFAULT_SCHEMA: &str = "public";

/// PostgreSQL adapter over a single-connection pool.
pub struct PostgresAdapter {
    pub pool: PgPool,
    pub identifier_policy: IdentifierPolicy,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("identifier_policy", &self.identifier_policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DialectAdapter for PostgresAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        introspection::list_tables(self).await
    }

    async fn describe_table(
        &self,
        table: &str,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<ForeignKeyDescriptor>)> {
        let table = crate::adapters::identifiers::prepare_identifier(table, self.identifier_policy)?;
        let mut columns = introspection::collect_columns(self, table).await?;
        let primary_keys = introspection::collect_primary_key(self, table).await?;
        for column in &mut columns {
            column.is_primary_key = primary_keys.contains(&column.name);
        }
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
