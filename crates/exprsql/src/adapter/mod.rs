//! Dialect adapters.
//!
//! The builder is provider-agnostic: everything dialect specific (identifier
//! quoting, placeholder syntax, pagination, INSERT/UPDATE/DELETE templates)
//! goes through a [`SqlAdapter`]. Adapters are read-only and shared between
//! builders through an `Arc`.

mod ident;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use ident::{IdentPart, QuoteStyle};
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;
pub use sqlserver::SqlServerAdapter;

use crate::error::SqlBuildError;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// The clauses of a rendered SELECT, each already prefixed with its keyword
/// (`"WHERE ..."`) or empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParts<'a> {
    pub selection: &'a str,
    pub source: &'a str,
    pub conditions: &'a str,
    pub grouping: &'a str,
    pub having: &'a str,
    pub order: &'a str,
    pub page_size: Option<u64>,
    pub page_index: u64,
}

/// One INSERT row: `(column, placeholder)` pairs.
pub type InsertRow = Vec<(String, String)>;

/// Provider-specific SQL syntax.
pub trait SqlAdapter: Send + Sync + std::fmt::Debug {
    /// Short dialect name for diagnostics.
    fn name(&self) -> &'static str;

    fn quote_table(&self, name: &str) -> String;

    fn quote_column(&self, name: &str) -> String;

    /// Qualified column reference.
    fn field(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote_table(table), self.quote_column(column))
    }

    /// Placeholder for the parameter `name`, which is the `index`-th (1-based)
    /// value issued by the builder.
    fn parameter(&self, name: &str, _index: usize) -> String {
        format!("@{name}")
    }

    /// Pagination suffix, or `None` when no pagination applies.
    fn pagination(&self, page_size: Option<u64>, page_index: u64) -> Option<String>;

    /// Full SELECT statement.
    fn query_string(&self, parts: &QueryParts<'_>) -> String {
        let select = format!("SELECT {} FROM {}", parts.selection, parts.source);
        let page = self.pagination(parts.page_size, parts.page_index);
        join_clauses(&[
            select.as_str(),
            parts.conditions,
            parts.grouping,
            parts.having,
            parts.order,
            page.as_deref().unwrap_or(""),
        ])
    }

    /// `INSERT INTO table (...) VALUES (...), (...)` plus the output clause.
    ///
    /// `table` is already quoted; columns are raw names.
    fn insert_command(&self, table: &str, rows: &[InsertRow], output: &[String]) -> String;

    /// `INSERT INTO target (...) SELECT ... FROM source WHERE ...`
    fn insert_from_command(
        &self,
        target: &str,
        columns: &[String],
        selection: &str,
        source: &str,
        conditions: &str,
    ) -> String {
        let cols: Vec<String> = columns.iter().map(|c| self.quote_column(c)).collect();
        let insert = format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            target,
            cols.join(", "),
            selection,
            source
        );
        join_clauses(&[insert.as_str(), conditions])
    }

    /// `UPDATE source SET ... WHERE ...`
    fn update_command(&self, set: &str, source: &str, conditions: &str) -> String {
        let update = format!("UPDATE {source} SET {set}");
        join_clauses(&[update.as_str(), conditions])
    }

    /// `DELETE FROM source WHERE ...`
    fn delete_command(&self, source: &str, conditions: &str) -> String {
        let delete = format!("DELETE FROM {source}");
        join_clauses(&[delete.as_str(), conditions])
    }
}

/// Join non-empty clauses with single spaces.
pub fn join_clauses(clauses: &[&str]) -> String {
    let mut out = String::new();
    for clause in clauses.iter().filter(|c| !c.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(clause);
    }
    out
}

/// Render the shared `INSERT INTO t (cols) VALUES (..), (..)` body.
pub(crate) fn insert_values(
    adapter: &(impl SqlAdapter + ?Sized),
    table: &str,
    rows: &[InsertRow],
    output: Option<&str>,
) -> String {
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.iter().map(|(c, _)| adapter.quote_column(c)).collect())
        .unwrap_or_default();
    let values: Vec<String> = rows
        .iter()
        .map(|row| {
            let placeholders: Vec<&str> = row.iter().map(|(_, p)| p.as_str()).collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    match output {
        Some(output) => format!(
            "INSERT INTO {} ({}) {} VALUES {}",
            table,
            columns.join(", "),
            output,
            values.join(", ")
        ),
        None => format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            columns.join(", "),
            values.join(", ")
        ),
    }
}

/// Built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mssql")]
    SqlServer,
    Sqlite,
}

impl Dialect {
    /// Shared adapter instance for this dialect.
    pub fn adapter(self) -> Arc<dyn SqlAdapter> {
        match self {
            Dialect::MySql => Arc::new(MySqlAdapter),
            Dialect::Postgres => Arc::new(PostgresAdapter),
            Dialect::SqlServer => Arc::new(SqlServerAdapter),
            Dialect::Sqlite => Arc::new(SqliteAdapter),
        }
    }
}

impl FromStr for Dialect {
    type Err = SqlBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(SqlBuildError::configuration(format!(
                "unknown SQL dialect '{other}'"
            ))),
        }
    }
}
