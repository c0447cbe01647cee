//! # exprsql
//!
//! Compile typed query expressions into parameterized SQL.
//!
//! ## Features
//!
//! - **Typed predicates**: conditions are built from entity fields
//!   (`User::EMAIL.contains("x")`), never from strings
//! - **Parameterized output**: every value becomes a named parameter
//!   (`@Param1`, `@Param2`, ...), numbered in emission order
//! - **Provider-agnostic**: quoting, placeholders and pagination come from a
//!   [`SqlAdapter`] (MySQL, PostgreSQL, SQL Server and SQLite built in)
//! - **No I/O**: the output is a command string plus a parameter map
//!
//! ## Example
//!
//! ```ignore
//! use exprsql::{Dialect, Entity, SqlBuilder, SqlContext};
//!
//! #[derive(Entity)]
//! #[sql(table = "Users")]
//! struct User {
//!     #[sql(column = "Id")]
//!     id: i64,
//!     #[sql(column = "Email")]
//!     email: String,
//! }
//!
//! let ctx = SqlContext::for_dialect(Dialect::MySql);
//! let query = SqlBuilder::<User>::select(&ctx)?
//!     .filter(User::EMAIL.contains("domain.com"))?
//!     .order_by_desc(User::ID)?
//!     .take(10);
//!
//! assert_eq!(
//!     query.command_text()?,
//!     "SELECT Users.* FROM Users WHERE Users.Email LIKE @Param1 ORDER BY Users.Id DESC LIMIT 10"
//! );
//! ```
//!
//! ## Layers
//!
//! - [`expr`]: the source expression tree users author
//! - [`resolver`]: lowers an [`Expr`] into the [`ast`] and emits it
//! - [`builder`]: accumulates clauses and parameters, renders the command
//! - [`adapter`]: dialect specifics
//! - [`query`] / [`collection`]: typed fluent sugar over the builder

pub mod adapter;
pub mod ast;
pub mod builder;
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod expr;
pub mod param;
pub mod query;
pub mod resolver;
pub mod trace;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use adapter::{
    Dialect, MySqlAdapter, PostgresAdapter, QueryParts, SqlAdapter, SqlServerAdapter,
    SqliteAdapter,
};
pub use builder::{JoinKind, SqlOperation, SqlQueryBuilder};
pub use collection::SqlBuilderCollection;
pub use config::{SqlConfig, SqlContext};
pub use entity::{Entity, EntityMeta, Field};
pub use error::{SqlBuildError, SqlBuildResult};
pub use expr::{BinaryOp, Expr, LikeMethod, all, any, not};
pub use param::Parameters;
pub use query::SqlBuilder;
pub use resolver::{ExpressionResolver, StringReplaceUpdateResolver, UpdateStatementResolver};
pub use value::{SqlEnum, Value};

#[cfg(feature = "derive")]
pub use exprsql_derive::{Entity, SqlEnum};
