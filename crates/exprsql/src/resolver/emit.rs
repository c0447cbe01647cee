//! Emission: walking a normalized node tree and driving the clause builder.

use crate::ast::{LikeNode, MemberNode, Node, OperationNode};
use crate::builder::SqlQueryBuilder;
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::{BinaryOp, LikeMethod};
use crate::value::Value;

/// Emit `node` into the builder's condition clause.
pub fn emit(builder: &mut SqlQueryBuilder, node: &Node) -> SqlBuildResult<()> {
    match node {
        Node::Member(m) => {
            builder.field_reference(&m.table, &m.field);
        }
        Node::Value(v) => {
            builder.constant(v.value.clone());
        }
        Node::Like(like) => emit_like(builder, like),
        Node::SingleOperation(op) => {
            builder.not();
            if renders_grouped(&op.child) {
                emit(builder, &op.child)?;
            } else {
                builder.begin_expression();
                emit(builder, &op.child)?;
                builder.end_expression();
            }
        }
        Node::Operation(op) => emit_operation(builder, op)?,
    }
    Ok(())
}

/// Whether `node` already renders inside its own parentheses.
fn renders_grouped(node: &Node) -> bool {
    match node {
        Node::Operation(op) => {
            op.operator.is_logical() || comparison_pair(&op.left, &op.right).is_none()
        }
        _ => false,
    }
}

enum Pair<'a> {
    MemberValue(&'a MemberNode, &'a Value, bool),
    MemberMember(&'a MemberNode, &'a MemberNode),
}

/// Operand shapes with a dedicated rendering; `None` means a generic group.
fn comparison_pair<'a>(left: &'a Node, right: &'a Node) -> Option<Pair<'a>> {
    match (left, right) {
        (Node::Member(m), Node::Value(v)) => Some(Pair::MemberValue(m, &v.value, false)),
        (Node::Value(v), Node::Member(m)) => Some(Pair::MemberValue(m, &v.value, true)),
        (Node::Member(l), Node::Member(r)) => Some(Pair::MemberMember(l, r)),
        _ => None,
    }
}

fn emit_operation(builder: &mut SqlQueryBuilder, op: &OperationNode) -> SqlBuildResult<()> {
    if op.operator.is_logical() {
        builder.begin_expression();
        emit(builder, &op.left)?;
        if op.operator == BinaryOp::And {
            builder.and();
        } else {
            builder.or();
        }
        emit(builder, &op.right)?;
        builder.end_expression();
        return Ok(());
    }

    if !op.operator.is_comparison() {
        return Err(SqlBuildError::unsupported(format!(
            "Binary: operator {} cannot appear in a predicate",
            op.operator
        )));
    }

    match comparison_pair(&op.left, &op.right) {
        Some(Pair::MemberValue(member, value, mirrored)) => {
            let operator = if mirrored {
                op.operator.mirror()
            } else {
                op.operator
            };
            emit_member_value(builder, member, operator, value)
        }
        Some(Pair::MemberMember(l, r)) => {
            builder.field_to_field_comparison(&l.table, &l.field, op.operator, &r.table, &r.field);
            Ok(())
        }
        None => {
            builder.begin_expression();
            emit(builder, &op.left)?;
            builder.comparison_operator(op.operator);
            emit(builder, &op.right)?;
            builder.end_expression();
            Ok(())
        }
    }
}

fn emit_member_value(
    builder: &mut SqlQueryBuilder,
    member: &MemberNode,
    operator: BinaryOp,
    value: &Value,
) -> SqlBuildResult<()> {
    if value.is_null() {
        match operator {
            BinaryOp::Equal => builder.field_is_null(&member.table, &member.field),
            BinaryOp::NotEqual => builder.field_is_not_null(&member.table, &member.field),
            other => {
                return Err(SqlBuildError::unsupported(format!(
                    "Binary: NULL can only be compared with = or <>, not {}",
                    other.sql()
                )));
            }
        };
        return Ok(());
    }
    builder.field_comparison(&member.table, &member.field, operator, value.clone());
    Ok(())
}

fn emit_like(builder: &mut SqlQueryBuilder, like: &LikeNode) {
    let MemberNode { table, field } = &like.member;
    match like.method {
        LikeMethod::Equals => {
            builder.field_comparison(table, field, BinaryOp::Equal, Value::Text(like.value.clone()));
        }
        method => {
            builder.field_like(table, field, method.pattern(&like.value));
        }
    }
}
