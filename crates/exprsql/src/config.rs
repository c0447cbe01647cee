//! Builder configuration.
//!
//! There is no process-wide adapter: every builder is created from a
//! [`SqlContext`] that carries the dialect and the parameter prefix.
//!
//! ```rust
//! use exprsql::{Dialect, SqlConfig, SqlContext};
//!
//! let ctx = SqlContext::new().dialect(Dialect::Postgres).parameter_prefix("p");
//! assert_eq!(ctx.prefix(), "p");
//!
//! let config: SqlConfig = SqlConfig::from_toml_str(r#"dialect = "mysql""#).unwrap();
//! assert_eq!(config.into_context().adapter().unwrap().name(), "mysql");
//! ```

use crate::adapter::{Dialect, SqlAdapter};
use crate::builder::{DEFAULT_PARAMETER_PREFIX, SqlQueryBuilder};
use crate::error::{SqlBuildError, SqlBuildResult};
use serde::Deserialize;
use std::sync::Arc;

/// Adapter and naming settings shared by all builders created from it.
#[derive(Debug, Clone)]
pub struct SqlContext {
    adapter: Option<Arc<dyn SqlAdapter>>,
    prefix: String,
}

impl Default for SqlContext {
    fn default() -> Self {
        Self {
            adapter: None,
            prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
        }
    }
}

impl SqlContext {
    /// Create a context without an adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortcut for `SqlContext::new().dialect(dialect)`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new().dialect(dialect)
    }

    /// Use one of the built-in dialects.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.adapter = Some(dialect.adapter());
        self
    }

    /// Use a custom adapter.
    pub fn with_adapter(mut self, adapter: Arc<dyn SqlAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Set the parameter name prefix (default `Param`).
    pub fn parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The configured adapter.
    pub fn adapter(&self) -> SqlBuildResult<Arc<dyn SqlAdapter>> {
        self.adapter.clone().ok_or_else(|| {
            SqlBuildError::configuration(
                "no SQL adapter configured; set a dialect on the SqlContext first",
            )
        })
    }

    /// A builder for `table` whose numbering starts after `start_index`.
    pub fn query_builder(
        &self,
        table: impl Into<String>,
        start_index: usize,
    ) -> SqlBuildResult<SqlQueryBuilder> {
        Ok(SqlQueryBuilder::try_new(table, self.adapter.clone())?
            .with_prefix(self.prefix.clone())
            .starting_at(start_index))
    }
}

/// Serializable form of [`SqlContext`].
///
/// ```toml
/// dialect = "postgres"
/// parameter_prefix = "p"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlConfig {
    pub dialect: Option<Dialect>,
    #[serde(default = "default_prefix")]
    pub parameter_prefix: String,
}

fn default_prefix() -> String {
    DEFAULT_PARAMETER_PREFIX.to_string()
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            dialect: None,
            parameter_prefix: default_prefix(),
        }
    }
}

impl SqlConfig {
    /// Parse from TOML.
    pub fn from_toml_str(s: &str) -> SqlBuildResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parse from JSON.
    pub fn from_json_str(s: &str) -> SqlBuildResult<Self> {
        serde_json::from_str(s).map_err(|e| SqlBuildError::configuration(e.to_string()))
    }

    pub fn into_context(self) -> SqlContext {
        let ctx = SqlContext::new().parameter_prefix(self.parameter_prefix);
        match self.dialect {
            Some(dialect) => ctx.dialect(dialect),
            None => ctx,
        }
    }
}

impl From<SqlConfig> for SqlContext {
    fn from(config: SqlConfig) -> Self {
        config.into_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_without_adapter_fails() {
        let err = SqlContext::new().query_builder("Users", 0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn context_carries_prefix_and_start_index() {
        let ctx = SqlContext::for_dialect(Dialect::MySql).parameter_prefix("p");
        let mut qb = ctx.query_builder("Users", 4).unwrap();
        assert_eq!(qb.next_param_id(), "p5");
    }

    #[test]
    fn config_from_toml() {
        let config = SqlConfig::from_toml_str(
            r#"
            dialect = "sqlserver"
            parameter_prefix = "arg"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Some(Dialect::SqlServer));
        let ctx = config.into_context();
        assert_eq!(ctx.prefix(), "arg");
        assert_eq!(ctx.adapter().unwrap().name(), "sqlserver");
    }

    #[test]
    fn config_defaults_and_errors() {
        let config = SqlConfig::from_json_str(r#"{"dialect": "pg"}"#).unwrap();
        assert_eq!(config.dialect, Some(Dialect::Postgres));
        assert_eq!(config.parameter_prefix, "Param");

        assert!(
            SqlConfig::from_toml_str(r#"dialect = "oracle""#)
                .unwrap_err()
                .is_configuration()
        );
        assert!(SqlConfig::from_toml_str("").unwrap().dialect.is_none());
    }
}
