//! `tracing` hooks.
//!
//! Enable via the crate feature: `exprsql = { features = ["tracing"] }` (on by
//! default). Without it every hook is an empty inline function.

use crate::builder::SqlOperation;
use crate::error::SqlBuildError;

/// Target used for all events, so subscribers can filter on it.
pub const TARGET: &str = "exprsql.sql";

/// Rendered SQL is truncated to this many bytes in log output.
#[cfg(feature = "tracing")]
const MAX_SQL_LENGTH: usize = 200;

#[cfg(feature = "tracing")]
fn truncate_sql(sql: &str) -> &str {
    if sql.len() <= MAX_SQL_LENGTH {
        return sql;
    }
    let mut end = MAX_SQL_LENGTH;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A command has been rendered.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn command_rendered(operation: SqlOperation, params: usize, sql: &str) {
    tracing::debug!(
        target: TARGET,
        operation = ?operation,
        params,
        truncated = sql.len() > MAX_SQL_LENGTH,
        sql = %truncate_sql(sql),
        "rendered SQL command"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn command_rendered(_operation: SqlOperation, _params: usize, _sql: &str) {}

/// The resolver rejected an expression.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn resolve_failed(context: &str, error: &SqlBuildError) {
    tracing::trace!(target: TARGET, context, error = %error, "expression resolution failed");
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn resolve_failed(_context: &str, _error: &SqlBuildError) {}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let sql = "é".repeat(150);
        let cut = truncate_sql(&sql);
        assert!(cut.len() <= MAX_SQL_LENGTH);
        assert!(sql.starts_with(cut));
        assert_eq!(truncate_sql("SELECT 1"), "SELECT 1");
    }
}
