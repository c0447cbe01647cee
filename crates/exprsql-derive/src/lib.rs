//! Derive macros for exprsql
//!
//! Provides `#[derive(Entity)]` and `#[derive(SqlEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;
mod sql_enum;

/// Derive `Entity` metadata for a struct.
///
/// # Example
///
/// ```ignore
/// use exprsql::Entity;
///
/// #[derive(Entity)]
/// #[sql(table = "Users", rename_all = "PascalCase")]
/// struct User {
///     id: i64,
///     #[sql(column = "EmailAddress")]
///     email: String,
/// }
///
/// assert_eq!(User::EMAIL.column(), "EmailAddress");
/// ```
///
/// # Generated
///
/// - `impl Entity` with the `(member, column)` mapping
/// - `pub const FIELD: Field<Self>` for every field, named in
///   SCREAMING_SNAKE_CASE
///
/// # Attributes
///
/// - `#[sql(table = "name")]` - Table name (defaults to the struct name)
/// - `#[sql(rename_all = "...")]` - Column naming for unannotated fields:
///   `PascalCase`, `camelCase`, `snake_case` or `SCREAMING_SNAKE_CASE`
/// - `#[sql(column = "name")]` - Map a field to a different column name
#[proc_macro_derive(Entity, attributes(sql))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `SqlEnum` for a fieldless enum.
///
/// The enum binds as its integer discriminant. It must also be `Copy`.
///
/// ```ignore
/// use exprsql::SqlEnum;
///
/// #[derive(Clone, Copy, SqlEnum)]
/// enum UserType {
///     Guest = 1,
///     Admin = 2,
///     Developer = 3,
/// }
/// ```
#[proc_macro_derive(SqlEnum)]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    sql_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
