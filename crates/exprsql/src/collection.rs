//! Several queries sent as one batch.
//!
//! Each query added to a [`SqlBuilderCollection`] starts numbering its
//! parameters after the previous query's last one, so the merged parameter
//! set never has two entries with the same name. Positional placeholders
//! (PostgreSQL `$n`) still count from 1 in every statement, since each
//! statement is prepared on its own.

use crate::builder::{SqlOperation, SqlQueryBuilder};
use crate::config::SqlContext;
use crate::entity::Entity;
use crate::error::SqlBuildResult;
use crate::expr::Expr;
use crate::param::Parameters;
use crate::query::SqlBuilder;

/// Separator between commands of a batch.
pub const COMMAND_SEPARATOR: &str = "\r\n";

/// An ordered batch of independently built queries.
#[derive(Debug, Clone)]
pub struct SqlBuilderCollection {
    ctx: SqlContext,
    queries: Vec<SqlQueryBuilder>,
}

impl SqlBuilderCollection {
    pub fn new(ctx: &SqlContext) -> Self {
        Self {
            ctx: ctx.clone(),
            queries: Vec::new(),
        }
    }

    fn next_index(&self) -> usize {
        self.queries
            .last()
            .map(SqlQueryBuilder::current_param_index)
            .unwrap_or(0)
    }

    fn add<T: Entity>(
        &mut self,
        operation: SqlOperation,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        let start = SqlBuilder::<T>::with_operation(&self.ctx, operation, self.next_index())?;
        self.queries.push(build(start)?.into_query_builder());
        Ok(self)
    }

    /// Add a SELECT over `T`.
    pub fn select<T: Entity>(
        &mut self,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        self.add(SqlOperation::Select, build)
    }

    /// Add a COUNT over `T`.
    pub fn count<T: Entity>(
        &mut self,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        self.add(SqlOperation::Count, build)
    }

    /// Add an INSERT of one record into `T`.
    pub fn insert<T: Entity>(
        &mut self,
        record: Expr,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        self.add(SqlOperation::Insert, |query: SqlBuilder<T>| build(query.values(record)?))
    }

    /// Add an UPDATE of `T`.
    pub fn update<T: Entity>(
        &mut self,
        assignments: Expr,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        self.add(SqlOperation::Update, |query: SqlBuilder<T>| build(query.set(assignments)?))
    }

    /// Add a DELETE from `T`.
    pub fn delete<T: Entity>(
        &mut self,
        build: impl FnOnce(SqlBuilder<T>) -> SqlBuildResult<SqlBuilder<T>>,
    ) -> SqlBuildResult<&mut Self> {
        self.add(SqlOperation::Delete, build)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// All commands joined with [`COMMAND_SEPARATOR`].
    pub fn command_text(&self) -> SqlBuildResult<String> {
        let commands = self
            .queries
            .iter()
            .map(SqlQueryBuilder::command_text)
            .collect::<SqlBuildResult<Vec<_>>>()?;
        Ok(commands.join(COMMAND_SEPARATOR))
    }

    /// Parameters of every query, in order.
    pub fn parameters(&self) -> Parameters {
        let mut merged = Parameters::new();
        for query in &self.queries {
            merged.extend(query.parameters());
        }
        merged
    }
}
