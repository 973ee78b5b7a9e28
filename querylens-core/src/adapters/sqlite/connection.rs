//! SQLite connection handling.
//!
//! # Target Formats
//! - Bare file path: `/path/to/database.db`, `./relative.sqlite`
//! - URL: `sqlite:///path/to/database.db`, `sqlite://./relative.db`
//! - In-memory: `sqlite::memory:` or `:memory:`

use super::SqliteAdapter;
use crate::config::ManagerConfig;
use crate::models::Dialect;
use crate::{Result, error::QueryLensError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// How a SQLite target should be handed to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    /// A URL understood by `SqliteConnectOptions::from_str`
    Url(String),
    /// A plain filesystem path, passed through untouched
    Path(String),
}

/// Classifies a connection target as URL or bare path.
pub fn normalize_target(target: &str) -> SqliteTarget {
    let trimmed = target.trim();
    if trimmed == ":memory:" {
        return SqliteTarget::Url("sqlite::memory:".to_string());
    }
    if trimmed.starts_with("sqlite:") {
        return SqliteTarget::Url(trimmed.to_string());
    }
    SqliteTarget::Path(trimmed.to_string())
}

fn is_in_memory(target: &SqliteTarget) -> bool {
    match target {
        SqliteTarget::Url(url) => url.contains(":memory:") || url.contains("mode=memory"),
        SqliteTarget::Path(_) => false,
    }
}

impl SqliteAdapter {
    /// Opens a SQLite database.
    ///
    /// # Security
    /// - Opens the file read-only when `config.read_only_session` is set
    /// - Never creates a missing database file
    ///
    /// # Errors
    /// Returns `ConnectionFailure` if the target is empty, malformed, missing
    /// or cannot be opened.
    pub async fn connect(target: &str, config: &ManagerConfig) -> Result<Self> {
        let normalized = normalize_target(target);

        let options = match &normalized {
            SqliteTarget::Path(path) if path.is_empty() => {
                return Err(QueryLensError::connection_failed(
                    Dialect::SQLite,
                    target,
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "empty database path",
                    ),
                ));
            }
            SqliteTarget::Path(path) => SqliteConnectOptions::new().filename(path),
            SqliteTarget::Url(url) => SqliteConnectOptions::from_str(url)
                .map_err(|e| QueryLensError::connection_failed(Dialect::SQLite, target, e))?,
        };

        let in_memory = is_in_memory(&normalized);
        let options = options.read_only(config.read_only_session && !in_memory);

        // One connection, kept alive for the adapter's lifetime so in-memory
        // databases survive between calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| QueryLensError::connection_failed(Dialect::SQLite, target, e))?;

        tracing::debug!(
            "Opened SQLite database (in_memory={}, read_only={})",
            in_memory,
            config.read_only_session && !in_memory
        );

        Ok(Self {
            pool,
            identifier_policy: config.identifier_policy,
            in_memory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_target() {
        assert_eq!(
            normalize_target(":memory:"),
            SqliteTarget::Url("sqlite::memory:".to_string())
        );
        assert_eq!(
            normalize_target("sqlite:///var/data/app.db"),
            SqliteTarget::Url("sqlite:///var/data/app.db".to_string())
        );
        assert_eq!(
            normalize_target(" ./data/sample.db "),
            SqliteTarget::Path("./data/sample.db".to_string())
        );
        assert_eq!(
            normalize_target("/tmp/what?.db"),
            SqliteTarget::Path("/tmp/what?.db".to_string())
        );
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory(&normalize_target(":memory:")));
        assert!(is_in_memory(&normalize_target("sqlite::memory:")));
        assert!(is_in_memory(&normalize_target(
            "sqlite:file:shared?mode=memory&cache=shared"
        )));
        assert!(!is_in_memory(&normalize_target("/tmp/app.db")));
    }

    #[tokio::test]
    async fn test_empty_target_is_connection_failure() {
        let err = SqliteAdapter::connect("  ", &ManagerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryLensError::ConnectionFailure { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        let err = SqliteAdapter::connect(missing.to_str().unwrap(), &ManagerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryLensError::ConnectionFailure { .. }));
    }
}
