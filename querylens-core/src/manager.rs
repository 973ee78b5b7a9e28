//! Connection manager: one active connection and its cached schema.
//!
//! # Lifecycle
//! - `connect` closes any previous connection (best-effort), opens the new
//!   one, introspects it and caches the resulting [`SchemaModel`]
//! - `close` releases the connection and drops the cached schema
//!
//! # Ownership
//! A manager is a single-owner value. `connect` and `close` take `&mut self`,
//! so a front end serving several users has to give each session its own
//! manager or serialize access to a shared one.

use crate::adapters::{self, DialectAdapter};
use crate::chart::{self, ChartConfiguration, ChartSuggestion};
use crate::config::ManagerConfig;
use crate::executor;
use crate::models::{Dialect, SchemaModel, TabularResult};
use crate::{Result, error::QueryLensError};
use std::sync::Arc;

/// The open connection together with the schema introspected from it.
struct ActiveConnection {
    adapter: Box<dyn DialectAdapter>,
    schema: Arc<SchemaModel>,
}

/// Owns at most one database connection.
///
/// # Example
///
/// ```rust,no_run
/// use querylens_core::manager::ConnectionManager;
/// use querylens_core::models::Dialect;
///
/// # async fn run() -> querylens_core::Result<()> {
/// let mut manager = ConnectionManager::default();
/// let schema = manager.connect(Dialect::SQLite, "./sales.db").await?;
/// println!("{} tables", schema.table_count());
///
/// let result = manager.execute("SELECT region, SUM(total) FROM orders GROUP BY region").await?;
/// println!("{} rows", result.row_count);
///
/// manager.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
    config: ManagerConfig,
    active: Option<ActiveConnection>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("dialect", &self.dialect())
            .finish()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self {
            config: ManagerConfig::default(),
            active: None,
        }
    }
}

impl ConnectionManager {
    /// Creates a manager with no active connection.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            active: None,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Connects to `target` and returns its schema.
    ///
    /// # Errors
    /// - `DriverUnavailable` if the dialect was compiled out
    /// - `ConnectionFailure` if the driver cannot connect
    /// - `Introspection` if a metadata query fails after connecting
    ///
    /// On any error the manager is left without a connection.
    pub async fn connect(&mut self, dialect: Dialect, target: &str) -> Result<Arc<SchemaModel>> {
        self.close_previous().await;

        tracing::info!("Connecting to {} database", dialect);
        let adapter = adapters::open_adapter(dialect, target, &self.config).await?;
        self.attach(adapter).await
    }

    /// Like [`ConnectionManager::connect`], with the dialect given by name
    /// (`sqlite`, `postgresql`/`postgres`, `mysql`).
    ///
    /// # Errors
    /// Returns `UnsupportedDialect` for any other name, before touching the
    /// current connection.
    pub async fn connect_named(&mut self, dialect: &str, target: &str) -> Result<Arc<SchemaModel>> {
        let dialect: Dialect = dialect.parse()?;
        self.connect(dialect, target).await
    }

    /// Installs an already-open adapter as the active connection.
    ///
    /// The previous connection is closed first, exactly as in `connect`.
    pub async fn connect_with(
        &mut self,
        adapter: Box<dyn DialectAdapter>,
    ) -> Result<Arc<SchemaModel>> {
        self.close_previous().await;
        self.attach(adapter).await
    }

    async fn close_previous(&mut self) {
        if let Some(previous) = self.active.take() {
            tracing::debug!(
                "Closing previous {} connection before reconnecting",
                previous.adapter.dialect()
            );
            previous.adapter.close().await;
        }
    }

    async fn attach(&mut self, adapter: Box<dyn DialectAdapter>) -> Result<Arc<SchemaModel>> {
        let schema = match adapters::introspect(adapter.as_ref()).await {
            Ok(schema) => Arc::new(schema),
            Err(e) => {
                tracing::error!("Introspection failed, dropping connection: {}", e);
                adapter.close().await;
                return Err(e);
            }
        };

        tracing::info!(
            "Connected to {}: {} tables, {} rows",
            schema.dialect,
            schema.table_count(),
            schema.total_rows()
        );

        self.active = Some(ActiveConnection {
            adapter,
            schema: Arc::clone(&schema),
        });
        Ok(schema)
    }

    /// Releases the active connection and cached schema. No-op when idle.
    pub async fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.adapter.close().await;
            tracing::info!("Closed {} connection", active.schema.dialect);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Dialect of the active connection.
    pub fn dialect(&self) -> Option<Dialect> {
        self.active.as_ref().map(|a| a.adapter.dialect())
    }

    /// The cached schema of the active connection.
    ///
    /// Repeated calls return the same shared model until the next `connect`.
    ///
    /// # Errors
    /// Returns `NotConnected` when there is no active connection.
    pub fn describe(&self) -> Result<Arc<SchemaModel>> {
        self.active
            .as_ref()
            .map(|a| Arc::clone(&a.schema))
            .ok_or(QueryLensError::NotConnected)
    }

    /// Schema context text for SQL generation.
    pub fn schema_description(&self) -> String {
        match &self.active {
            Some(active) => active.schema.description(),
            None => "No database connected.".to_string(),
        }
    }

    /// Executes a read-only query with the configured row cap.
    ///
    /// # Errors
    /// `NotConnected`, `WriteOperationRejected` or `ExecutionFailure`.
    pub async fn execute(&self, sql: &str) -> Result<TabularResult> {
        self.execute_with_limit(sql, self.config.max_rows).await
    }

    /// Executes a read-only query returning at most `max_rows` rows.
    pub async fn execute_with_limit(&self, sql: &str, max_rows: usize) -> Result<TabularResult> {
        let active = self.active.as_ref().ok_or(QueryLensError::NotConnected)?;
        executor::execute(active.adapter.as_ref(), sql, max_rows).await
    }

    /// Builds a chart configuration for a result. Works without a connection.
    pub fn build_chart(
        &self,
        result: &TabularResult,
        suggestion: &ChartSuggestion,
    ) -> ChartConfiguration {
        chart::build(result, suggestion)
    }
}
