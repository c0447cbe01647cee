//! Typed fluent front-end.
//!
//! `SqlBuilder<T>` wraps one [`SqlQueryBuilder`] whose primary table is the
//! table of entity `T`. Every method consumes the builder and hands it back,
//! so a chain reads top to bottom and a failed step drops the half-built
//! query:
//!
//! ```rust
//! use exprsql::{Dialect, Entity, EntityMeta, Field, SqlBuilder, SqlContext};
//!
//! struct User;
//!
//! impl Entity for User {
//!     const META: EntityMeta = EntityMeta::new("User", "Users", &[]);
//! }
//!
//! impl User {
//!     const ID: Field<User> = Field::new("Id");
//! }
//!
//! # fn main() -> exprsql::SqlBuildResult<()> {
//! let ctx = SqlContext::for_dialect(Dialect::MySql);
//! let query = SqlBuilder::<User>::select(&ctx)?
//!     .filter(User::ID.gt(10))?
//!     .order_by(User::ID)?
//!     .take(10);
//!
//! assert_eq!(
//!     query.command_text()?,
//!     "SELECT Users.* FROM Users WHERE Users.Id > @Param1 ORDER BY Users.Id LIMIT 10"
//! );
//! # Ok(())
//! # }
//! ```

use crate::builder::{JoinKind, SqlOperation, SqlQueryBuilder};
use crate::config::SqlContext;
use crate::entity::Entity;
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::{BinaryOp, Expr};
use crate::param::Parameters;
use crate::resolver::{ExpressionResolver, Projection, projection};
use crate::value::Value;
use serde::Serialize;
use std::marker::PhantomData;

/// Fluent query over entity `T`.
#[must_use]
pub struct SqlBuilder<T> {
    builder: SqlQueryBuilder,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for SqlBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for SqlBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlBuilder")
            .field("builder", &self.builder)
            .finish()
    }
}

impl<T: Entity> SqlBuilder<T> {
    pub(crate) fn with_operation(
        ctx: &SqlContext,
        operation: SqlOperation,
        start_index: usize,
    ) -> SqlBuildResult<Self> {
        let mut builder = ctx.query_builder(T::META.table, start_index)?;
        builder.set_operation(operation);
        Ok(Self::from_builder(builder))
    }

    fn from_builder(builder: SqlQueryBuilder) -> Self {
        Self {
            builder,
            _entity: PhantomData,
        }
    }

    // ==================== Entry points ====================

    /// `SELECT T.* FROM T`
    pub fn select(ctx: &SqlContext) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Select, 0)
    }

    /// `SELECT COUNT(*) FROM T`
    pub fn count(ctx: &SqlContext) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Count, 0)
    }

    /// A SELECT limited to one row.
    pub fn select_single(ctx: &SqlContext) -> SqlBuildResult<Self> {
        Ok(Self::select(ctx)?.take(1))
    }

    /// `INSERT INTO T (...) VALUES (...)` from a record of `member: value`
    /// entries.
    pub fn insert(ctx: &SqlContext, record: Expr) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Insert, 0)?.values(record)
    }

    /// INSERT from a serializable host value; members are read by name.
    pub fn insert_value<V: Serialize + ?Sized>(ctx: &SqlContext, value: &V) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Insert, 0)?.value(value)
    }

    /// `UPDATE T SET ...` from a record of `member: value` entries.
    pub fn update(ctx: &SqlContext, assignments: Expr) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Update, 0)?.set(assignments)
    }

    /// `DELETE FROM T`
    pub fn delete(ctx: &SqlContext) -> SqlBuildResult<Self> {
        Self::with_operation(ctx, SqlOperation::Delete, 0)
    }

    fn resolver(&mut self) -> ExpressionResolver<'_> {
        ExpressionResolver::new(&mut self.builder)
    }

    /// AND onto existing conditions; no connective on the first one.
    fn and_next(&mut self) {
        if self.builder.has_conditions() {
            self.builder.and();
        }
    }

    // ==================== WHERE ====================

    /// Add a predicate, ANDed with any previous one.
    pub fn filter(mut self, predicate: Expr) -> SqlBuildResult<Self> {
        self.and_next();
        self.resolver().resolve_query(&predicate)?;
        Ok(self)
    }

    /// Add a predicate, ORed with the previous one.
    pub fn or_filter(mut self, predicate: Expr) -> SqlBuildResult<Self> {
        if self.builder.has_conditions() {
            self.builder.or();
        }
        self.resolver().resolve_query(&predicate)?;
        Ok(self)
    }

    /// Add a raw condition template.
    ///
    /// `@0`, `@1`, ... refer to `args` by position: a column argument is
    /// spliced in as its quoted name, anything else becomes a parameter.
    ///
    /// ```rust
    /// # use exprsql::{Dialect, Entity, EntityMeta, Field, SqlBuilder, SqlContext};
    /// # struct User;
    /// # impl Entity for User { const META: EntityMeta = EntityMeta::new("User", "Users", &[]); }
    /// # impl User { const UUID: Field<User> = Field::new("Uuid"); }
    /// # fn main() -> exprsql::SqlBuildResult<()> {
    /// let ctx = SqlContext::for_dialect(Dialect::MySql);
    /// let query = SqlBuilder::<User>::select(&ctx)?
    ///     .filter_raw("BIN_TO_UUID(@0) = @1", vec![User::UUID.into(), "abc".into()])?;
    /// assert_eq!(
    ///     query.command_text()?,
    ///     "SELECT Users.* FROM Users WHERE BIN_TO_UUID(Users.Uuid) = @Param1"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter_raw(mut self, template: &str, args: Vec<Expr>) -> SqlBuildResult<Self> {
        self.and_next();
        self.resolver().resolve_raw(template, &args)?;
        Ok(self)
    }

    /// `key IN (values...)`
    pub fn filter_in<V: Into<Value>>(
        mut self,
        key: impl Into<Expr>,
        values: impl IntoIterator<Item = V>,
    ) -> SqlBuildResult<Self> {
        self.and_next();
        let values = values.into_iter().map(Into::into).collect();
        self.resolver().query_by_is_in(&key.into(), values, false)?;
        Ok(self)
    }

    /// `key NOT IN (values...)`
    pub fn filter_not_in<V: Into<Value>>(
        mut self,
        key: impl Into<Expr>,
        values: impl IntoIterator<Item = V>,
    ) -> SqlBuildResult<Self> {
        self.and_next();
        let values = values.into_iter().map(Into::into).collect();
        self.resolver().query_by_is_in(&key.into(), values, true)?;
        Ok(self)
    }

    /// `key IN (SELECT ...)`.
    ///
    /// The sub-query is built by `build` from a builder over `S` that shares
    /// this query's parameter counter.
    pub fn filter_in_query<S: Entity>(
        self,
        key: impl Into<Expr>,
        build: impl FnOnce(SqlBuilder<S>) -> SqlBuildResult<SqlBuilder<S>>,
    ) -> SqlBuildResult<Self> {
        self.in_query(key.into(), build, false)
    }

    /// `key NOT IN (SELECT ...)`
    pub fn filter_not_in_query<S: Entity>(
        self,
        key: impl Into<Expr>,
        build: impl FnOnce(SqlBuilder<S>) -> SqlBuildResult<SqlBuilder<S>>,
    ) -> SqlBuildResult<Self> {
        self.in_query(key.into(), build, true)
    }

    fn in_query<S: Entity>(
        mut self,
        key: Expr,
        build: impl FnOnce(SqlBuilder<S>) -> SqlBuildResult<SqlBuilder<S>>,
        negate: bool,
    ) -> SqlBuildResult<Self> {
        self.and_next();
        let sub = SqlBuilder::<S>::from_builder(
            self.builder.fork(S::META.table, SqlOperation::Select),
        );
        let sub = build(sub)?;
        self.resolver()
            .query_by_is_in_query(&key, &sub.builder, negate)?;
        Ok(self)
    }

    /// `(key BETWEEN start AND end)`, ANDed.
    pub fn filter_between(
        mut self,
        key: impl Into<Expr>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> SqlBuildResult<Self> {
        self.and_next();
        self.resolver()
            .query_between(&key.into(), start.into(), end.into(), false)?;
        Ok(self)
    }

    /// `(key NOT BETWEEN start AND end)`, ANDed.
    pub fn filter_not_between(
        mut self,
        key: impl Into<Expr>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> SqlBuildResult<Self> {
        self.and_next();
        self.resolver()
            .query_between(&key.into(), start.into(), end.into(), true)?;
        Ok(self)
    }

    /// `(key BETWEEN start AND end)`, ORed.
    pub fn or_filter_between(
        mut self,
        key: impl Into<Expr>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> SqlBuildResult<Self> {
        if self.builder.has_conditions() {
            self.builder.or();
        }
        self.resolver()
            .query_between(&key.into(), start.into(), end.into(), false)?;
        Ok(self)
    }

    // ==================== Projection ====================

    /// Add columns to the selection: a field, a record of fields (aliased by
    /// entry name), or an entity parameter for `table.*`.
    pub fn select_fields(mut self, projection: impl Into<Expr>) -> SqlBuildResult<Self> {
        self.resolver().select(&projection.into())?;
        Ok(self)
    }

    /// `SELECT COUNT(key)`
    pub fn select_count(mut self, key: impl Into<Expr>) -> SqlBuildResult<Self> {
        self.builder.set_operation(SqlOperation::Count);
        self.resolver().select_with_function("COUNT", &key.into())?;
        Ok(self)
    }

    /// `SELECT FUNC(key)`, e.g. `MAX`, `SUM`.
    pub fn select_aggregate(
        mut self,
        function: &str,
        key: impl Into<Expr>,
    ) -> SqlBuildResult<Self> {
        self.resolver().select_with_function(function, &key.into())?;
        Ok(self)
    }

    // ==================== Ordering / grouping ====================

    pub fn order_by(mut self, key: impl Into<Expr>) -> SqlBuildResult<Self> {
        self.resolver().order_by(&key.into(), false)?;
        Ok(self)
    }

    pub fn order_by_desc(mut self, key: impl Into<Expr>) -> SqlBuildResult<Self> {
        self.resolver().order_by(&key.into(), true)?;
        Ok(self)
    }

    pub fn group_by(mut self, key: impl Into<Expr>) -> SqlBuildResult<Self> {
        self.resolver().group_by(&key.into())?;
        Ok(self)
    }

    /// `HAVING FUNC(key) op value`
    pub fn having(
        mut self,
        function: &str,
        key: impl Into<Expr>,
        op: BinaryOp,
        value: impl Into<Value>,
    ) -> SqlBuildResult<Self> {
        self.resolver()
            .having(function, &key.into(), op, value.into())?;
        Ok(self)
    }

    // ==================== Pagination ====================

    pub fn take(mut self, size: u64) -> Self {
        self.builder.take(size);
        self
    }

    /// Skip `offset` rows.
    pub fn skip(mut self, offset: u64) -> Self {
        self.builder.skip(offset);
        self
    }

    /// Zero-based page `index` of `size` rows.
    pub fn page(mut self, index: u64, size: u64) -> Self {
        self.builder.page(index, size);
        self
    }

    // ==================== Joins ====================

    /// `KIND JOIN J ON on`
    pub fn join<J: Entity>(mut self, kind: JoinKind, on: Expr) -> SqlBuildResult<Self> {
        self.resolver().join(kind, J::META.table, &on)?;
        Ok(self)
    }

    pub fn inner_join<J: Entity>(self, on: Expr) -> SqlBuildResult<Self> {
        self.join::<J>(JoinKind::Inner, on)
    }

    pub fn left_join<J: Entity>(self, on: Expr) -> SqlBuildResult<Self> {
        self.join::<J>(JoinKind::Left, on)
    }

    pub fn right_join<J: Entity>(self, on: Expr) -> SqlBuildResult<Self> {
        self.join::<J>(JoinKind::Right, on)
    }

    pub fn full_join<J: Entity>(self, on: Expr) -> SqlBuildResult<Self> {
        self.join::<J>(JoinKind::Full, on)
    }

    // ==================== Insert / update ====================

    /// Add one more INSERT row from a record.
    pub fn values(mut self, record: Expr) -> SqlBuildResult<Self> {
        self.resolver().insert(&T::META, &record)?;
        Ok(self)
    }

    /// Add one more INSERT row from a serializable host value.
    pub fn value<V: Serialize + ?Sized>(mut self, value: &V) -> SqlBuildResult<Self> {
        let captured = Value::capture(value)
            .map_err(|e| SqlBuildError::argument(format!("cannot capture insert value: {e}")))?;
        self.resolver().insert_value(&T::META, &captured)?;
        Ok(self)
    }

    /// Columns returned by the INSERT (`RETURNING`, `OUTPUT INSERTED.`, ...).
    pub fn output(mut self, projection: impl Into<Expr>) -> SqlBuildResult<Self> {
        let columns = self::projection(&projection.into())?
            .into_iter()
            .map(|entry| match entry {
                Projection::Field { column, .. } => Ok(column),
                Projection::All(table) => Err(SqlBuildError::unsupported(format!(
                    "Parameter: INSERT output needs columns, not {table}.*"
                ))),
            })
            .collect::<SqlBuildResult<Vec<_>>>()?;
        self.builder.insert_output(columns);
        Ok(self)
    }

    /// Turn this SELECT into `INSERT INTO D (columns) SELECT ...`.
    ///
    /// `columns` is a field or record of fields of `D`, listed in the same
    /// order as this query's selection.
    pub fn insert_into<D: Entity>(mut self, columns: impl Into<Expr>) -> SqlBuildResult<Self> {
        let mut names = Vec::new();
        for entry in self::projection(&columns.into())? {
            match entry {
                Projection::Field { column, .. } => names.push(column),
                Projection::All(_) => names.extend(D::META.column_names().map(String::from)),
            }
        }
        self.builder.insert_from(D::META.table, names);
        Ok(self)
    }

    /// Add more `SET` assignments.
    pub fn set(mut self, assignments: Expr) -> SqlBuildResult<Self> {
        self.resolver().update(&T::META, &assignments)?;
        Ok(self)
    }

    // ==================== Output ====================

    /// The complete command.
    pub fn command_text(&self) -> SqlBuildResult<String> {
        self.builder.command_text()
    }

    /// Only the `WHERE ...` part; SELECT and COUNT queries only.
    pub fn where_command_text(&self) -> SqlBuildResult<String> {
        self.builder.where_command_text()
    }

    /// Table an INSERT writes to.
    pub fn insert_target(&self) -> SqlBuildResult<String> {
        self.builder.insert_target()
    }

    pub fn parameters(&self) -> &Parameters {
        self.builder.parameters()
    }

    /// Last parameter number handed out.
    pub fn current_param_index(&self) -> usize {
        self.builder.current_param_index()
    }

    pub fn query_builder(&self) -> &SqlQueryBuilder {
        &self.builder
    }

    pub fn into_query_builder(self) -> SqlQueryBuilder {
        self.builder
    }
}
