//! Core library for QueryLens.
//!
//! This crate connects to a relational database, describes its schema in one
//! normalized model, runs read-only queries with a bounded result size and
//! turns tabular results into chart configurations.
//!
//! # Security Guarantees
//! - Queries starting with a write keyword are rejected before execution
//! - Connections are opened read-only (SQLite) or in READ ONLY session mode
//!   (PostgreSQL, MySQL) by default
//! - Connection targets are sanitized before they appear in errors or logs
//!
//! # Architecture
//! - One [`DialectAdapter`] implementation per backend, chosen by [`Dialect`]
//! - A single-owner [`ConnectionManager`] holding the active adapter and its
//!   cached [`SchemaModel`]
//! - Pure functions for result formatting and chart building

pub mod adapters;
pub mod chart;
pub mod config;
pub mod error;
pub mod executor;
pub mod format;
pub mod logging;
pub mod manager;
pub mod models;

// Re-export commonly used types
pub use adapters::{DialectAdapter, introspect, is_dialect_available, open_adapter};
pub use chart::{ChartConfiguration, ChartKind, ChartSuggestion, ChartType, is_chartable};
pub use config::{DEFAULT_MAX_ROWS, IdentifierPolicy, ManagerConfig};
pub use error::{QueryLensError, Result};
pub use format::format_markdown;
pub use manager::ConnectionManager;
pub use models::{
    ColumnDescriptor, Dialect, ForeignKeyDescriptor, SchemaModel, TableDescriptor, TabularResult,
};
