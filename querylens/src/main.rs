//! Read-only SQL exploration tool.
//!
//! This binary connects to one database, prints its schema, runs read-only
//! queries as Markdown tables and emits Chart.js configurations for query
//! results.
//!
//! # Security Guarantees
//! - Queries starting with a write keyword are rejected before execution
//! - Sessions are opened read-only unless explicitly disabled
//! - Connection targets are sanitized in logs and errors

use clap::{Args, Parser, Subcommand};
use querylens_core::{
    ChartSuggestion, ChartType, ConnectionManager, Dialect, IdentifierPolicy, ManagerConfig,
    QueryLensError, Result, error::redact_database_url, is_chartable, is_dialect_available,
    logging::init_logging,
};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "querylens")]
#[command(about = "Read-only SQL exploration and charting")]
#[command(version)]
#[command(long_about = "
QueryLens - read-only SQL exploration

Connects to a SQLite, PostgreSQL or MySQL database and:
- Describes tables, columns, primary and foreign keys
- Runs read-only queries and prints Markdown tables
- Builds Chart.js configurations from query results

SECURITY FEATURES:
- Write statements are rejected before they reach the database
- Read-only sessions by default
- Credentials are sanitized in logs and errors

EXAMPLES:
  querylens --target shop.db schema
  querylens --dialect postgresql --target postgres://localhost/shop query 'SELECT * FROM orders'
  querylens --target shop.db chart --chart-type pie 'SELECT name, qty FROM stock'
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the schema description
    Schema,
    /// Run a read-only query and print a Markdown table
    Query(QueryArgs),
    /// Run a read-only query and print a chart configuration
    Chart(ChartArgs),
    /// List supported dialects
    Dialects,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Database dialect
    #[arg(
        long,
        env = "QUERYLENS_DIALECT",
        default_value = "sqlite",
        help = "Database dialect (sqlite, postgresql, mysql)"
    )]
    pub dialect: Dialect,

    /// Connection target
    #[arg(
        long,
        env = "QUERYLENS_TARGET",
        help = "File path, URL or DSN (credentials will be sanitized in logs)"
    )]
    pub target: Option<String>,

    /// Row cap for query results
    #[arg(
        long,
        env = "QUERYLENS_MAX_ROWS",
        default_value_t = querylens_core::DEFAULT_MAX_ROWS,
        help = "Maximum number of rows returned by a query"
    )]
    pub max_rows: usize,

    /// Connection timeout in seconds
    #[arg(long, default_value = "30", help = "Connection timeout in seconds")]
    pub connect_timeout: u64,

    /// Refuse unsafe identifiers instead of quoting them
    #[arg(
        long,
        help = "Reject table names with quote or control characters during introspection"
    )]
    pub reject_unsafe_identifiers: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    /// SQL text
    #[arg(help = "Read-only SQL statement")]
    pub sql: String,
}

#[derive(Args)]
pub struct ChartArgs {
    /// SQL text
    #[arg(help = "Read-only SQL statement")]
    pub sql: String,

    /// Chart type
    #[arg(long, help = "bar, horizontal_bar, line, pie, doughnut or scatter")]
    pub chart_type: Option<ChartType>,

    /// Label column
    #[arg(long, help = "Column used for labels (defaults to the first column)")]
    pub x: Option<String>,

    /// Value columns
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated value columns (defaults to the second column)"
    )]
    pub y: Vec<String>,

    /// Chart title
    #[arg(long, default_value = "", help = "Chart title")]
    pub title: String,

    /// Suggestion as JSON
    #[arg(
        long,
        conflicts_with_all = ["chart_type", "x", "y"],
        help = "Chart suggestion as JSON text (chart_type, x_column, y_columns, title)"
    )]
    pub suggestion: Option<String>,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    if let Command::Dialects = cli.command {
        list_supported_dialects();
        return Ok(());
    }

    let mut manager = ConnectionManager::new(manager_config(&cli.connection))?;
    let Some(target) = cli.connection.target.as_deref() else {
        return Err(QueryLensError::configuration(
            "a connection target is required (--target or QUERYLENS_TARGET)",
        ));
    };

    info!("Dialect: {}", cli.connection.dialect);
    info!("Target: {}", redact_database_url(target));

    manager
        .connect(cli.connection.dialect, target)
        .await
        .map_err(|e| {
            error!("Failed to connect: {}", e);
            e
        })?;

    let outcome = run_command(&manager, &cli.command).await;
    manager.close().await;
    outcome
}

fn manager_config(args: &ConnectionArgs) -> ManagerConfig {
    let policy = if args.reject_unsafe_identifiers {
        IdentifierPolicy::Reject
    } else {
        IdentifierPolicy::Quote
    };

    ManagerConfig::default()
        .with_max_rows(args.max_rows)
        .with_connect_timeout(Duration::from_secs(args.connect_timeout))
        .with_identifier_policy(policy)
}

async fn run_command(manager: &ConnectionManager, command: &Command) -> Result<()> {
    match command {
        Command::Schema => {
            println!("{}", manager.schema_description());
        }
        Command::Query(args) => {
            let result = manager.execute(&args.sql).await?;
            info!("Query returned {} rows", result.row_count);
            println!("{}", querylens_core::format_markdown(&result));
        }
        Command::Chart(args) => {
            let result = manager.execute(&args.sql).await?;
            if !is_chartable(&result) {
                return Err(QueryLensError::configuration(
                    "query returned no rows to chart",
                ));
            }

            let suggestion = chart_suggestion(args, &result.columns);
            let config = manager.build_chart(&result, &suggestion);
            let payload = serde_json::json!({
                "config": config.to_chartjs(),
                "title": config.title,
            });
            let text = serde_json::to_string_pretty(&payload).map_err(|e| {
                QueryLensError::configuration(format!("Failed to serialize chart: {}", e))
            })?;
            println!("{}", text);
        }
        Command::Dialects => list_supported_dialects(),
    }
    Ok(())
}

/// Resolves the chart suggestion from `--suggestion` or the individual flags.
fn chart_suggestion(args: &ChartArgs, columns: &[String]) -> ChartSuggestion {
    if let Some(text) = &args.suggestion {
        return ChartSuggestion::parse_lenient(text, columns, &args.title);
    }

    let mut suggestion = match args.chart_type {
        Some(chart_type) => ChartSuggestion::with_chart_type(columns, chart_type, &args.title),
        None => ChartSuggestion::fallback(columns, &args.title),
    };
    if let Some(x) = &args.x {
        suggestion.x_column = x.clone();
    }
    if !args.y.is_empty() {
        suggestion.y_columns = args.y.clone();
    }
    suggestion
}

fn list_supported_dialects() {
    println!("Supported Dialects:");
    println!();

    for dialect in Dialect::ALL {
        let status = if is_dialect_available(dialect) {
            "available"
        } else {
            "not compiled in"
        };
        println!("{} ({}):", dialect, status);
        match dialect {
            Dialect::SQLite => {
                println!("  Target:  path to a database file, sqlite: URL or :memory:");
                println!("  Example: /home/user/shop.db");
            }
            Dialect::PostgreSQL => {
                println!("  Target:  postgres:// URL or key=value DSN");
                println!("  Example: host=localhost dbname=shop user=reader");
            }
            Dialect::MySQL => {
                println!("  Target:  mysql:// URL, or user@host:port/database");
                println!("  Example: reader@localhost:3306/shop");
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_defaults() {
        let cli = Cli::try_parse_from(["querylens", "--target", "shop.db", "query", "SELECT 1"])
            .unwrap();

        assert_eq!(cli.connection.dialect, Dialect::SQLite);
        assert_eq!(cli.connection.max_rows, querylens_core::DEFAULT_MAX_ROWS);
        assert!(matches!(cli.command, Command::Query(ref args) if args.sql == "SELECT 1"));

        let config = manager_config(&cli.connection);
        assert_eq!(config.identifier_policy, IdentifierPolicy::Quote);
        assert!(config.read_only_session);
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        let result = Cli::try_parse_from(["querylens", "--dialect", "oracle", "schema"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chart_type_help_lists_parseable_types() {
        for name in ["bar", "horizontal_bar", "line", "pie", "doughnut", "scatter"] {
            let cli = Cli::try_parse_from(["querylens", "chart", "--chart-type", name, "SELECT 1"]);
            assert!(cli.is_ok(), "chart type {} should parse", name);
        }

        let cli = Cli::try_parse_from(["querylens", "chart", "--chart-type", "area", "SELECT 1"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_chart_flags_override_fallback() {
        let cli = Cli::try_parse_from([
            "querylens",
            "chart",
            "--chart-type",
            "line",
            "--y",
            "revenue,cost",
            "SELECT month, revenue, cost FROM sales",
        ])
        .unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };

        let columns = vec![
            "month".to_string(),
            "revenue".to_string(),
            "cost".to_string(),
        ];
        let suggestion = chart_suggestion(&args, &columns);

        assert_eq!(suggestion.chart_type, ChartType::Line);
        assert_eq!(suggestion.x_column, "month");
        assert_eq!(suggestion.y_columns, vec!["revenue", "cost"]);
    }

    #[test]
    fn test_chart_suggestion_json() {
        let cli = Cli::try_parse_from([
            "querylens",
            "chart",
            "--suggestion",
            r#"{"chart_type": "pie", "x_column": "name", "y_columns": ["qty"]}"#,
            "SELECT name, qty FROM stock",
        ])
        .unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };

        let columns = vec!["name".to_string(), "qty".to_string()];
        let suggestion = chart_suggestion(&args, &columns);

        assert_eq!(suggestion.chart_type, ChartType::Pie);
        assert_eq!(suggestion.y_columns, vec!["qty"]);
    }

    #[test]
    fn test_reject_flag_sets_policy() {
        let cli = Cli::try_parse_from([
            "querylens",
            "--reject-unsafe-identifiers",
            "--max-rows",
            "50",
            "schema",
        ])
        .unwrap();

        let config = manager_config(&cli.connection);
        assert_eq!(config.identifier_policy, IdentifierPolicy::Reject);
        assert_eq!(config.max_rows, 50);
    }
}
