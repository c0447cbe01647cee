//! Eager evaluation of sub-expressions that do not touch a column.

use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::{BinaryOp, Expr, MethodCall, UnaryOp};
use crate::value::Value;

/// Evaluate `expr` to a concrete value.
///
/// Anything rooted at a query parameter has no value here and is rejected.
pub fn evaluate(expr: &Expr) -> SqlBuildResult<Value> {
    match expr {
        Expr::Constant(value) => Ok(value.clone()),
        Expr::Enum(e) => Ok(Value::Int(e.value)),
        Expr::Parameter(meta) => Err(SqlBuildError::unsupported(format!(
            "parameter of {} has no value outside a query",
            meta.name
        ))),
        Expr::Member { target, member } => {
            let receiver = evaluate(target)?;
            receiver.member(&member.name).ok_or_else(|| {
                SqlBuildError::argument(format!(
                    "{} value has no member '{}'",
                    receiver.kind(),
                    member.name
                ))
            })
        }
        Expr::Unary { op, operand } => match op {
            UnaryOp::Not => match evaluate(operand)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(SqlBuildError::argument(format!(
                    "NOT expects a boolean, got {}",
                    other.kind()
                ))),
            },
            UnaryOp::Convert | UnaryOp::Quote => evaluate(operand),
        },
        Expr::Binary { left, op, right } => {
            let l = evaluate(left)?;
            let r = evaluate(right)?;
            binary(&l, *op, &r)
        }
        Expr::Call(call) => evaluate_call(call),
        Expr::Record(_) => Err(SqlBuildError::unsupported(
            "record construction cannot be evaluated to a single value",
        )),
    }
}

/// Invoke a call's evaluator with the receiver value first, then the arguments.
pub fn evaluate_call(call: &MethodCall) -> SqlBuildResult<Value> {
    let Some(eval) = &call.eval else {
        return Err(SqlBuildError::unsupported(format!(
            "Call: method '{}' has no evaluator",
            call.method
        )));
    };
    let mut args = Vec::with_capacity(call.args.len() + 1);
    if let Some(receiver) = &call.receiver {
        args.push(evaluate(receiver)?);
    }
    for arg in &call.args {
        args.push(evaluate(arg)?);
    }
    eval(args.as_slice())
}

/// Whether `expr` reaches a query parameter anywhere.
pub fn references_parameter(expr: &Expr) -> bool {
    match expr {
        Expr::Parameter(_) => true,
        Expr::Constant(_) | Expr::Enum(_) => false,
        Expr::Member { target, .. } => references_parameter(target),
        Expr::Unary { operand, .. } => references_parameter(operand),
        Expr::Binary { left, right, .. } => {
            references_parameter(left) || references_parameter(right)
        }
        Expr::Call(call) => {
            call.receiver.as_deref().is_some_and(references_parameter)
                || call.args.iter().any(references_parameter)
        }
        Expr::Record(entries) => entries.iter().any(|(_, e)| references_parameter(e)),
    }
}

fn binary(l: &Value, op: BinaryOp, r: &Value) -> SqlBuildResult<Value> {
    match op {
        BinaryOp::And | BinaryOp::Or => match (l, r) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(mismatch(l, op, r)),
        },
        BinaryOp::Equal => Ok(Value::Bool(l == r)),
        BinaryOp::NotEqual => Ok(Value::Bool(l != r)),
        _ if op.is_comparison() => Err(SqlBuildError::unsupported(format!(
            "cannot evaluate {op} between constant values"
        ))),
        _ => arithmetic(l, op, r),
    }
}

fn arithmetic(l: &Value, op: BinaryOp, r: &Value) -> SqlBuildResult<Value> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Subtract => a.checked_sub(*b),
                BinaryOp::Multiply => a.checked_mul(*b),
                BinaryOp::Divide => a.checked_div(*b),
                BinaryOp::Modulo => a.checked_rem(*b),
                _ => return Err(mismatch(l, op, r)),
            };
            result.map(Value::Int).ok_or_else(|| {
                SqlBuildError::argument(format!("integer overflow or division by zero in {a} {} {b}", op.sql()))
            })
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (as_f64(l), as_f64(r));
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Modulo => a % b,
                _ => return Err(mismatch(l, op, r)),
            };
            Ok(Value::Float(result))
        }
        (Value::Text(a), Value::Text(b)) if op == BinaryOp::Add => Ok(Value::Text(format!("{a}{b}"))),
        _ => Err(mismatch(l, op, r)),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn mismatch(l: &Value, op: BinaryOp, r: &Value) -> SqlBuildError {
    SqlBuildError::argument(format!(
        "cannot apply {op} to {} and {}",
        l.kind(),
        r.kind()
    ))
}
