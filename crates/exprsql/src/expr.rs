//! Source expressions: the user-authored query description.
//!
//! An [`Expr`] is what a caller writes; the resolver lowers it into the
//! [`Node`](crate::ast::Node) tree and then into SQL. The shapes mirror what a
//! host-language expression tree would contain (constants, member access
//! chains, unary/binary operators, method calls, record construction), but
//! every value is captured explicitly at construction time instead of being
//! read back through reflection.
//!
//! ```rust
//! use exprsql::{Expr, Entity, EntityMeta, Field};
//!
//! struct User;
//! impl Entity for User {
//!     const META: EntityMeta = EntityMeta::new("User", "Users", &[("id", "Id"), ("email", "Email")]);
//! }
//! impl User {
//!     const ID: Field<User> = Field::new("id");
//!     const EMAIL: Field<User> = Field::new("email");
//! }
//!
//! let predicate = User::ID.gt(10).and(User::EMAIL.contains("example.com"));
//! assert_eq!(predicate.kind(), "Binary");
//! ```

use crate::entity::{Entity, EntityMeta, Field};
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::value::{SqlEnum, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Binary operators accepted in source expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Modulo
        )
    }

    /// SQL spelling of the operator.
    pub fn sql(self) -> &'static str {
        match self {
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Operator with its operands swapped: `a < b` is `b > a`.
    pub fn mirror(self) -> Self {
        match self {
            BinaryOp::GreaterThan => BinaryOp::LessThan,
            BinaryOp::GreaterThanOrEqual => BinaryOp::LessThanOrEqual,
            BinaryOp::LessThan => BinaryOp::GreaterThan,
            BinaryOp::LessThanOrEqual => BinaryOp::GreaterThanOrEqual,
            other => other,
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Unary operators accepted in source expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
    /// Type conversion; transparent to the resolver.
    Convert,
    /// Quoted sub-expression; transparent to the resolver.
    Quote,
}

/// String pattern-match methods recognized on members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeMethod {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
}

impl LikeMethod {
    pub fn name(self) -> &'static str {
        match self {
            LikeMethod::Equals => "Equals",
            LikeMethod::StartsWith => "StartsWith",
            LikeMethod::EndsWith => "EndsWith",
            LikeMethod::Contains => "Contains",
        }
    }

    /// Decorate a search value with `%` wildcards.
    ///
    /// `Equals` is left untouched because it renders as a plain comparison.
    pub fn pattern(self, value: &str) -> String {
        match self {
            LikeMethod::Equals => value.to_string(),
            LikeMethod::StartsWith => format!("{value}%"),
            LikeMethod::EndsWith => format!("%{value}"),
            LikeMethod::Contains => format!("%{value}%"),
        }
    }
}

impl FromStr for LikeMethod {
    type Err = SqlBuildError;

    /// Case-insensitive; `starts_with` and `StartsWith` both match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "equals" => Ok(LikeMethod::Equals),
            "startswith" => Ok(LikeMethod::StartsWith),
            "endswith" => Ok(LikeMethod::EndsWith),
            "contains" => Ok(LikeMethod::Contains),
            _ => Err(SqlBuildError::unsupported(format!(
                "'{s}' is not a pattern-match method"
            ))),
        }
    }
}

/// An enum constant, kept symbolic until the resolver coerces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConst {
    pub type_name: &'static str,
    pub variant: &'static str,
    pub value: i64,
}

impl EnumConst {
    pub fn of<E: SqlEnum>(value: E) -> Self {
        Self {
            type_name: E::TYPE_NAME,
            variant: value.variant_name(),
            value: value.discriminant(),
        }
    }
}

/// One step of a member-access chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Host member name.
    pub name: Cow<'static, str>,
    /// Entity declaring the member; `None` means "the root parameter's entity",
    /// or a plain object member when the chain is rooted at a captured value.
    pub owner: Option<EntityMeta>,
}

impl MemberRef {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            owner: None,
        }
    }

    pub fn of(owner: EntityMeta, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            owner: Some(owner),
        }
    }
}

/// Host-side evaluator for a method call, invoked with already-evaluated
/// arguments (receiver first when there is one).
pub type EvalFn = Arc<dyn Fn(&[Value]) -> SqlBuildResult<Value> + Send + Sync>;

/// A method call node.
#[derive(Clone)]
pub struct MethodCall {
    pub receiver: Option<Box<Expr>>,
    pub method: Cow<'static, str>,
    pub args: Vec<Expr>,
    pub eval: Option<EvalFn>,
}

impl std::fmt::Debug for MethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodCall")
            .field("receiver", &self.receiver)
            .field("method", &self.method)
            .field("args", &self.args)
            .field("eval", &self.eval.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A source expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal or captured value.
    Constant(Value),
    /// Enum constant; coerced to its discriminant during resolution.
    Enum(EnumConst),
    /// The query parameter standing for a row of an entity.
    Parameter(EntityMeta),
    /// `target.member`
    Member {
        target: Box<Expr>,
        member: MemberRef,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Call(MethodCall),
    /// Record construction `{ alias: expr, ... }`; only valid as a projection.
    Record(Vec<(String, Expr)>),
}

impl Expr {
    /// Shape name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "Constant",
            Expr::Enum(_) => "EnumConstant",
            Expr::Parameter(_) => "Parameter",
            Expr::Member { .. } => "MemberAccess",
            Expr::Unary { .. } => "Unary",
            Expr::Binary { .. } => "Binary",
            Expr::Call(_) => "Call",
            Expr::Record(_) => "Record",
        }
    }

    // ==================== Leaves ====================

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn null() -> Self {
        Expr::Constant(Value::Null)
    }

    /// Capture a serializable host value (struct, map, scalar).
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> SqlBuildResult<Self> {
        Value::capture(value)
            .map(Expr::Constant)
            .map_err(|e| SqlBuildError::argument(format!("cannot capture value: {e}")))
    }

    pub fn enum_const<E: SqlEnum>(value: E) -> Self {
        Expr::Enum(EnumConst::of(value))
    }

    /// Parameter of entity `E`.
    pub fn param<E: Entity>() -> Self {
        Expr::Parameter(E::META)
    }

    // ==================== Member access ====================

    pub fn member(target: Expr, member: MemberRef) -> Self {
        Expr::Member {
            target: Box::new(target),
            member,
        }
    }

    /// `self.name`, with the member resolved against the root entity.
    pub fn get(self, name: impl Into<Cow<'static, str>>) -> Self {
        Expr::member(self, MemberRef::named(name))
    }

    /// `self.field` where the member is declared on `F`.
    pub fn field<F: Entity>(self, field: Field<F>) -> Self {
        Expr::member(self, field.member())
    }

    // ==================== Calls ====================

    /// A free function call evaluated on the host side.
    pub fn call<F>(method: impl Into<Cow<'static, str>>, args: Vec<Expr>, eval: F) -> Self
    where
        F: Fn(&[Value]) -> SqlBuildResult<Value> + Send + Sync + 'static,
    {
        Expr::Call(MethodCall {
            receiver: None,
            method: method.into(),
            args,
            eval: Some(Arc::new(eval)),
        })
    }

    /// A method call on `self`, evaluated on the host side.
    pub fn method<F>(self, method: impl Into<Cow<'static, str>>, args: Vec<Expr>, eval: F) -> Self
    where
        F: Fn(&[Value]) -> SqlBuildResult<Value> + Send + Sync + 'static,
    {
        Expr::Call(MethodCall {
            receiver: Some(Box::new(self)),
            method: method.into(),
            args,
            eval: Some(Arc::new(eval)),
        })
    }

    /// A method call by name only; the resolver decides what it means.
    pub fn invoke(self, method: impl Into<Cow<'static, str>>, args: Vec<Expr>) -> Self {
        Expr::Call(MethodCall {
            receiver: Some(Box::new(self)),
            method: method.into(),
            args,
            eval: None,
        })
    }

    /// `member.Contains(value)` and friends.
    pub fn like_call(member: Expr, method: LikeMethod, value: Expr) -> Self {
        member.invoke(method.name(), vec![value])
    }

    // ==================== Operators ====================

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn eq(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Equal, right.into())
    }

    pub fn ne(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::NotEqual, right.into())
    }

    pub fn gt(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::GreaterThan, right.into())
    }

    pub fn gte(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::GreaterThanOrEqual, right.into())
    }

    pub fn lt(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::LessThan, right.into())
    }

    pub fn lte(self, right: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::LessThanOrEqual, right.into())
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOp::Or, other)
    }

    pub fn not(self) -> Self {
        Expr::unary(UnaryOp::Not, self)
    }

    pub fn convert(self) -> Self {
        Expr::unary(UnaryOp::Convert, self)
    }

    pub fn quote(self) -> Self {
        Expr::unary(UnaryOp::Quote, self)
    }

    pub fn add(self, other: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Add, other.into())
    }

    pub fn sub(self, other: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Subtract, other.into())
    }

    pub fn mul(self, other: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Multiply, other.into())
    }

    pub fn div(self, other: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Divide, other.into())
    }

    pub fn rem(self, other: impl Into<Expr>) -> Self {
        Expr::binary(self, BinaryOp::Modulo, other.into())
    }

    // ==================== Projections ====================

    /// Record construction for projections.
    pub fn record<S: Into<String>>(entries: impl IntoIterator<Item = (S, Expr)>) -> Self {
        Expr::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// AND all expressions together, left to right.
///
/// Returns `None` for an empty list.
pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(Expr::and)
}

/// OR all expressions together, left to right.
pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(Expr::or)
}

/// Negate an expression.
pub fn not(expr: Expr) -> Expr {
    expr.not()
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl std::ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::And, rhs)
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Or, rhs)
    }
}

impl<E: Entity> From<Field<E>> for Expr {
    fn from(field: Field<E>) -> Self {
        field.expr()
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Constant(v)
    }
}

impl From<EnumConst> for Expr {
    fn from(v: EnumConst) -> Self {
        Expr::Enum(v)
    }
}

macro_rules! impl_expr_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Constant(Value::from(v))
                }
            }
        )*
    };
}

impl_expr_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    Vec<u8>,
    Uuid,
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
    serde_json::Value
);

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(v: Option<T>) -> Self {
        Expr::Constant(Value::from(v))
    }
}
