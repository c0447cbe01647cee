//! Test entities shared by the integration tests.
#![allow(dead_code)]

use exprsql::value::SqlEnum;
use exprsql::{Dialect, Entity, EntityMeta, Expr, Field, SqlContext, Value};

pub fn mysql() -> SqlContext {
    SqlContext::for_dialect(Dialect::MySql)
}

pub struct User;

impl Entity for User {
    const META: EntityMeta = EntityMeta::new(
        "User",
        "Users",
        &[
            ("uuid", "Uuid"),
            ("id", "Id"),
            ("first_name", "FirstName"),
            ("last_name", "LastName"),
            ("email", "Email"),
            ("role", "Role"),
            ("modified_date", "ModifiedDate"),
        ],
    );
}

impl User {
    pub const UUID: Field<User> = Field::new("uuid");
    pub const ID: Field<User> = Field::new("id");
    pub const FIRST_NAME: Field<User> = Field::new("first_name");
    pub const LAST_NAME: Field<User> = Field::new("last_name");
    pub const EMAIL: Field<User> = Field::new("email");
    pub const ROLE: Field<User> = Field::new("role");
    pub const MODIFIED_DATE: Field<User> = Field::new("modified_date");
}

pub struct UserGroup;

impl Entity for UserGroup {
    const META: EntityMeta = EntityMeta::new("UserGroup", "UserGroups", &[]);
}

impl UserGroup {
    pub const ID: Field<UserGroup> = Field::new("Id");
    pub const NAME: Field<UserGroup> = Field::new("Name");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Guest = 1,
    Admin = 2,
    Developer = 3,
}

impl SqlEnum for UserType {
    const TYPE_NAME: &'static str = "UserType";

    fn discriminant(self) -> i64 {
        self as i64
    }

    fn variant_name(self) -> &'static str {
        match self {
            UserType::Guest => "Guest",
            UserType::Admin => "Admin",
            UserType::Developer => "Developer",
        }
    }
}

impl From<UserType> for Expr {
    fn from(v: UserType) -> Self {
        Expr::enum_const(v)
    }
}

impl From<UserType> for Value {
    fn from(v: UserType) -> Self {
        Value::Int(v.discriminant())
    }
}
