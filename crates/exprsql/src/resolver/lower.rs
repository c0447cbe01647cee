//! Lowering of source expressions into the resolved node tree.

use super::eval::{evaluate, evaluate_call, references_parameter};
use crate::ast::{MemberNode, Node};
use crate::entity::EntityMeta;
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::{Expr, LikeMethod, MemberRef, MethodCall, UnaryOp};
use crate::value::Value;

/// Lower `expr` into a node tree.
pub fn lower(expr: &Expr) -> SqlBuildResult<Node> {
    match expr {
        Expr::Constant(value) => Ok(Node::value(value.clone())),
        Expr::Enum(e) => Ok(Node::value(Value::Int(e.value))),
        Expr::Parameter(meta) => Err(SqlBuildError::unsupported(format!(
            "Parameter: a bare {} row cannot be used as an operand",
            meta.name
        ))),
        Expr::Member { member, .. } => match chain_root(expr) {
            Expr::Parameter(meta) => Ok(Node::Member(column_of(meta, member))),
            _ => evaluate(expr).map(Node::value),
        },
        Expr::Unary { op, operand } => match op {
            UnaryOp::Not => Ok(Node::not(lower(operand)?)),
            UnaryOp::Convert | UnaryOp::Quote => lower(operand),
        },
        Expr::Binary { left, op, right } => {
            if op.is_arithmetic() {
                if references_parameter(expr) {
                    return Err(SqlBuildError::unsupported(format!(
                        "Binary: arithmetic ({}) on a column is not supported",
                        op.sql()
                    )));
                }
                return evaluate(expr).map(Node::value);
            }
            Ok(Node::operation(lower(left)?, *op, lower(right)?))
        }
        Expr::Call(call) => lower_call(call),
        Expr::Record(_) => Err(SqlBuildError::unsupported(
            "Record: record construction is only valid as a projection",
        )),
    }
}

/// Lower an expression that must be a single column reference.
pub fn lower_member(expr: &Expr) -> SqlBuildResult<MemberNode> {
    match lower(expr)? {
        Node::Member(member) => Ok(member),
        _ => Err(SqlBuildError::unsupported(format!(
            "{}: expected a column reference",
            expr.kind()
        ))),
    }
}

/// Walk a member chain to its root, looking through conversions.
pub(crate) fn chain_root(expr: &Expr) -> &Expr {
    match expr {
        Expr::Member { target, .. } => chain_root(target),
        Expr::Unary {
            op: UnaryOp::Convert | UnaryOp::Quote,
            operand,
        } => chain_root(operand),
        other => other,
    }
}

/// The outermost member names the column; nested access only leads to it.
fn column_of(root: &EntityMeta, member: &MemberRef) -> MemberNode {
    let owner = member.owner.unwrap_or(*root);
    let (table, column) = owner.resolve(&member.name);
    MemberNode::new(table, column)
}

fn lower_call(call: &MethodCall) -> SqlBuildResult<Node> {
    let column_receiver = call
        .receiver
        .as_deref()
        .filter(|r| matches!(chain_root(r), Expr::Parameter(_)));

    let Some(receiver) = column_receiver else {
        return evaluate_call(call).map(Node::value);
    };

    let Ok(method) = call.method.parse::<LikeMethod>() else {
        return Err(SqlBuildError::unsupported(format!(
            "Call: method '{}' on a column is not supported",
            call.method
        )));
    };

    let [argument] = call.args.as_slice() else {
        return Err(SqlBuildError::argument(format!(
            "{} expects exactly 1 argument, got {}",
            method.name(),
            call.args.len()
        )));
    };

    let member = lower_member(receiver)?;
    match evaluate(argument)? {
        Value::Text(value) => Ok(Node::like(method, member, value)),
        other => Err(SqlBuildError::argument(format!(
            "{} expects a text argument, got {}",
            method.name(),
            other.kind()
        ))),
    }
}
