//! Connection manager configuration.
//!
//! This module provides [`ManagerConfig`] with read-only defaults and the
//! [`IdentifierPolicy`] that governs how table names are placed into
//! introspection and row-count statements.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on rows returned by a single query.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// How table identifiers are treated before being interpolated into SQL.
///
/// Metadata lookups that can take bound parameters always do; this policy
/// only matters for the statements where the identifier has to be spliced
/// into the query text (SQLite PRAGMAs and every dialect's `COUNT(*)`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierPolicy {
    /// Quote the identifier, doubling any embedded quote character
    #[default]
    Quote,
    /// Refuse identifiers containing quotes, backticks, semicolons or control characters
    Reject,
}

/// Configuration for a [`crate::manager::ConnectionManager`].
///
/// # Security
/// This struct intentionally does NOT store connection targets or
/// credentials; those are passed to `connect` and handed straight to the
/// driver.
///
/// # Example
/// ```rust
/// use querylens_core::config::{IdentifierPolicy, ManagerConfig};
///
/// let config = ManagerConfig::default()
///     .with_max_rows(250)
///     .with_identifier_policy(IdentifierPolicy::Reject);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_rows, 250);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Row cap applied by `execute` when the caller does not pass one
    pub max_rows: usize,
    /// Open SQLite read-only and put server sessions in READ ONLY mode
    pub read_only_session: bool,
    /// How long to wait for the driver to establish a connection
    pub connect_timeout: Duration,
    /// Treatment of identifiers interpolated into metadata queries
    pub identifier_policy: IdentifierPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            read_only_session: true,
            connect_timeout: Duration::from_secs(30),
            identifier_policy: IdentifierPolicy::Quote,
        }
    }
}

impl ManagerConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns error if the row cap or timeout is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_rows == 0 {
            return Err(crate::error::QueryLensError::configuration(
                "max_rows must be greater than 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::QueryLensError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builder method to set the default row cap.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Builder method to toggle read-only sessions.
    pub fn with_read_only_session(mut self, read_only: bool) -> Self {
        self.read_only_session = read_only;
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the identifier policy.
    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }
}
