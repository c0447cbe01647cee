//! Negation normalization.
//!
//! Runs between lowering and emission so the emitter only ever sees a `NOT`
//! in a position where wrapping its child in parentheses is correct:
//!
//! - `NOT NOT x` collapses to `x`, at any depth
//! - `NOT true` / `NOT false` fold to the opposite constant
//! - `(NOT a) = b` becomes `NOT (a = b)`; `(NOT a) = (NOT b)` becomes `a = b`
//!   (same for `<>`)
//! - operands of `AND` / `OR` keep their own negation, so `NOT a OR b` never
//!   turns into `NOT (a OR b)`

use crate::ast::{Node, OperationNode, SingleOperationNode, SingleOperator, ValueNode};
use crate::expr::BinaryOp;
use crate::value::Value;

/// Normalize all negations in `node`.
pub fn normalize(node: Node) -> Node {
    match node {
        Node::SingleOperation(SingleOperationNode {
            operator: SingleOperator::Not,
            child,
        }) => negate(normalize(*child)),
        Node::Operation(OperationNode {
            left,
            operator,
            right,
        }) => {
            let left = normalize(*left);
            let right = normalize(*right);
            if matches!(operator, BinaryOp::Equal | BinaryOp::NotEqual) {
                hoist_negation(left, operator, right)
            } else {
                Node::operation(left, operator, right)
            }
        }
        leaf => leaf,
    }
}

/// Negate an already normalized node.
fn negate(node: Node) -> Node {
    match split_negation(node) {
        Ok(inner) => inner,
        Err(Node::Value(ValueNode {
            value: Value::Bool(b),
        })) => Node::value(!b),
        Err(other) => Node::not(other),
    }
}

fn hoist_negation(left: Node, operator: BinaryOp, right: Node) -> Node {
    match (split_negation(left), split_negation(right)) {
        (Ok(l), Ok(r)) => Node::operation(l, operator, r),
        (Ok(l), Err(r)) | (Err(l), Ok(r)) => negate(Node::operation(l, operator, r)),
        (Err(l), Err(r)) => Node::operation(l, operator, r),
    }
}

/// `Ok(child)` for a `NOT child` node, `Err(node)` otherwise.
fn split_negation(node: Node) -> Result<Node, Node> {
    match node {
        Node::SingleOperation(SingleOperationNode {
            operator: SingleOperator::Not,
            child,
        }) => Ok(*child),
        other => Err(other),
    }
}
