//! Method calls that render as SQL functions inside an UPDATE's SET list.

use crate::builder::SqlQueryBuilder;
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::value::Value;

/// Turns a recognized method call on a column into a `SET` entry.
pub trait UpdateStatementResolver: Send + Sync {
    /// Method name this resolver handles (matched case-insensitively).
    fn method(&self) -> &'static str;

    /// Append the `SET` entry for `column` with the evaluated arguments.
    fn resolve_statement(
        &self,
        builder: &mut SqlQueryBuilder,
        column: &str,
        args: Vec<Value>,
    ) -> SqlBuildResult<()>;
}

/// `column.replace(old, new)` → `column = REPLACE(column, @p1, @p2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringReplaceUpdateResolver;

impl UpdateStatementResolver for StringReplaceUpdateResolver {
    fn method(&self) -> &'static str {
        "Replace"
    }

    fn resolve_statement(
        &self,
        builder: &mut SqlQueryBuilder,
        column: &str,
        args: Vec<Value>,
    ) -> SqlBuildResult<()> {
        let Ok([old, new]) = <[Value; 2]>::try_from(args) else {
            return Err(SqlBuildError::argument(
                "REPLACE requires 2 arguments: the old and the new string",
            ));
        };
        builder.update_field_replace_string(column, old, new);
        Ok(())
    }
}

static RESOLVERS: &[&dyn UpdateStatementResolver] = &[&StringReplaceUpdateResolver];

/// Built-in resolver for `method`, if any.
pub fn find(method: &str) -> Option<&'static dyn UpdateStatementResolver> {
    RESOLVERS
        .iter()
        .copied()
        .find(|r| r.method().eq_ignore_ascii_case(method))
}
