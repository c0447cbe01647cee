//! Resolved expression tree.
//!
//! These nodes carry no behavior: the resolver produces them from an
//! [`Expr`](crate::expr::Expr) and the emitter walks them to drive the clause
//! builder.

use crate::expr::{BinaryOp, LikeMethod};
use crate::value::Value;

/// A column reference: `table.field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNode {
    pub table: String,
    pub field: String,
}

impl MemberNode {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }
}

/// A concrete value, already evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub value: Value,
}

/// Binary relational or logical operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    pub left: Box<Node>,
    pub operator: BinaryOp,
    pub right: Box<Node>,
}

/// Unary operators surviving resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleOperator {
    Not,
}

/// Unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleOperationNode {
    pub operator: SingleOperator,
    pub child: Box<Node>,
}

/// Pattern-match predicate on a column.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeNode {
    pub method: LikeMethod,
    pub member: MemberNode,
    pub value: String,
}

/// One resolved expression fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Member(MemberNode),
    Value(ValueNode),
    Operation(OperationNode),
    SingleOperation(SingleOperationNode),
    Like(LikeNode),
}

impl Node {
    pub fn member(table: impl Into<String>, field: impl Into<String>) -> Self {
        Node::Member(MemberNode::new(table, field))
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Node::Value(ValueNode {
            value: value.into(),
        })
    }

    pub fn operation(left: Node, operator: BinaryOp, right: Node) -> Self {
        Node::Operation(OperationNode {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn not(child: Node) -> Self {
        Node::SingleOperation(SingleOperationNode {
            operator: SingleOperator::Not,
            child: Box::new(child),
        })
    }

    pub fn like(method: LikeMethod, member: MemberNode, value: impl Into<String>) -> Self {
        Node::Like(LikeNode {
            method,
            member,
            value: value.into(),
        })
    }

    /// The negated child, when this is a `NOT` node.
    pub fn as_negation(&self) -> Option<&Node> {
        match self {
            Node::SingleOperation(SingleOperationNode {
                operator: SingleOperator::Not,
                child,
            }) => Some(child),
            _ => None,
        }
    }
}
