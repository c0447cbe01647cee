//! Entity metadata: mapping host types and members onto tables and columns.
//!
//! The resolver only ever *consumes* this mapping as a pure lookup
//! `(entity, member) -> (table, column)`. It is normally generated by
//! `#[derive(Entity)]`, but can be written by hand:
//!
//! ```rust
//! use exprsql::{Entity, EntityMeta, Field};
//!
//! struct User;
//!
//! impl Entity for User {
//!     const META: EntityMeta = EntityMeta::new("User", "Users", &[("id", "Id"), ("email", "Email")]);
//! }
//!
//! impl User {
//!     const ID: Field<User> = Field::new("id");
//! }
//!
//! assert_eq!(User::ID.column(), "Id");
//! assert_eq!(User::ID.table(), "Users");
//! ```

use crate::expr::{Expr, LikeMethod, MemberRef};
use crate::value::Value;
use std::marker::PhantomData;

/// Static table/column mapping for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMeta {
    /// Host type name.
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// `(member, column)` pairs. Members missing here map to a column of the same name.
    pub columns: &'static [(&'static str, &'static str)],
}

impl EntityMeta {
    pub const fn new(
        name: &'static str,
        table: &'static str,
        columns: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            table,
            columns,
        }
    }

    /// Column name for a member.
    pub fn column<'a>(&self, member: &'a str) -> &'a str {
        self.columns
            .iter()
            .find(|(m, _)| *m == member)
            .map(|(_, c)| *c)
            .unwrap_or(member)
    }

    /// Resolve a member to its `(table, column)` pair.
    pub fn resolve<'a>(&self, member: &'a str) -> (&'static str, &'a str) {
        (self.table, self.column(member))
    }

    /// All mapped columns in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(_, c)| *c)
    }
}

/// A host type that maps onto a table.
pub trait Entity {
    const META: EntityMeta;

    /// The query parameter standing for a row of this entity.
    fn param() -> Expr {
        Expr::Parameter(Self::META)
    }
}

/// Typed handle to one member of an entity.
///
/// Fields are the authoring surface for predicates: `User::EMAIL.contains("x")`
/// builds the same expression a hand-written member access plus method call
/// would.
pub struct Field<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Field<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Field<E> {}

impl<E> std::fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<E> Field<E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    /// Host member name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E: Entity> Field<E> {
    /// Table the field belongs to.
    pub fn table(&self) -> &'static str {
        E::META.table
    }

    /// Column name the field maps to.
    pub fn column(&self) -> &'static str {
        E::META.column(self.name)
    }

    /// Member reference declared on `E`.
    pub fn member(&self) -> MemberRef {
        MemberRef::of(E::META, self.name)
    }

    /// Member access rooted at the `E` query parameter.
    pub fn expr(&self) -> Expr {
        Expr::member(E::param(), self.member())
    }

    pub fn eq(self, value: impl Into<Expr>) -> Expr {
        self.expr().eq(value)
    }

    pub fn ne(self, value: impl Into<Expr>) -> Expr {
        self.expr().ne(value)
    }

    pub fn gt(self, value: impl Into<Expr>) -> Expr {
        self.expr().gt(value)
    }

    pub fn gte(self, value: impl Into<Expr>) -> Expr {
        self.expr().gte(value)
    }

    pub fn lt(self, value: impl Into<Expr>) -> Expr {
        self.expr().lt(value)
    }

    pub fn lte(self, value: impl Into<Expr>) -> Expr {
        self.expr().lte(value)
    }

    /// `field IS NULL`
    pub fn is_null(self) -> Expr {
        self.expr().eq(Expr::Constant(Value::Null))
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(self) -> Expr {
        self.expr().ne(Expr::Constant(Value::Null))
    }

    /// Compare against a field of another (or the same) entity.
    pub fn eq_field<F: Entity>(self, other: Field<F>) -> Expr {
        self.expr().eq(other.expr())
    }

    pub fn ne_field<F: Entity>(self, other: Field<F>) -> Expr {
        self.expr().ne(other.expr())
    }

    /// String `Equals` pattern method; renders as a plain equality.
    pub fn equals(self, value: impl Into<Expr>) -> Expr {
        Expr::like_call(self.expr(), LikeMethod::Equals, value.into())
    }

    pub fn starts_with(self, value: impl Into<Expr>) -> Expr {
        Expr::like_call(self.expr(), LikeMethod::StartsWith, value.into())
    }

    pub fn ends_with(self, value: impl Into<Expr>) -> Expr {
        Expr::like_call(self.expr(), LikeMethod::EndsWith, value.into())
    }

    pub fn contains(self, value: impl Into<Expr>) -> Expr {
        Expr::like_call(self.expr(), LikeMethod::Contains, value.into())
    }
}

/// Table name of an entity.
pub fn table_name<E: Entity>() -> &'static str {
    E::META.table
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account;

    impl Entity for Account {
        const META: EntityMeta = EntityMeta::new("Account", "Accounts", &[("owner_id", "OwnerId")]);
    }

    #[test]
    fn column_falls_back_to_member_name() {
        assert_eq!(Account::META.column("owner_id"), "OwnerId");
        assert_eq!(Account::META.column("balance"), "balance");
        assert_eq!(Account::META.resolve("owner_id"), ("Accounts", "OwnerId"));
    }

    #[test]
    fn field_reports_table_and_column() {
        let f: Field<Account> = Field::new("owner_id");
        assert_eq!(f.table(), "Accounts");
        assert_eq!(f.column(), "OwnerId");
        assert_eq!(table_name::<Account>(), "Accounts");
    }
}
