//! Expression resolver.
//!
//! Resolution is three passes over an [`Expr`]:
//!
//! 1. [`lower`] turns the source expression into a [`Node`] tree, evaluating
//!    everything that does not touch a column
//! 2. [`normalize`] rewrites negations into positions the emitter can render
//! 3. [`emit`] walks the tree and calls the clause builder primitives in order
//!
//! [`resolve`] runs the first two and is a pure function of its input.
//! [`ExpressionResolver`] runs all three against a builder and also handles
//! the non-boolean forms: projections, ordering keys, joins, raw templates,
//! `IN` lists, `BETWEEN`, inserts and updates.

mod emit;
mod eval;
mod lower;
mod normalize;
pub mod update;

pub use eval::evaluate;
pub use lower::{lower, lower_member};
pub use normalize::normalize;
pub use update::{StringReplaceUpdateResolver, UpdateStatementResolver};

use crate::ast::{MemberNode, Node};
use crate::builder::{JoinKind, SqlOperation, SqlQueryBuilder};
use crate::entity::EntityMeta;
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::{BinaryOp, Expr};
use crate::value::Value;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Lower and normalize `expr`.
pub fn resolve(expr: &Expr) -> SqlBuildResult<Node> {
    lower(expr).map(normalize).inspect_err(|e| {
        crate::trace::resolve_failed(expr.kind(), e);
    })
}

/// One entry of a resolved projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `table.*`
    All(&'static str),
    /// `table.column [AS alias]`
    Field {
        table: String,
        column: String,
        alias: Option<String>,
    },
}

/// Resolve a projection: a row parameter, a single member, or a record of
/// members.
pub fn projection(expr: &Expr) -> SqlBuildResult<Vec<Projection>> {
    match expr {
        Expr::Parameter(meta) => Ok(vec![Projection::All(meta.table)]),
        Expr::Record(entries) => entries
            .iter()
            .map(|(alias, value)| -> SqlBuildResult<Projection> {
                let MemberNode { table, field } = lower_member(value)?;
                let alias = (*alias != field).then(|| alias.clone());
                Ok(Projection::Field {
                    table,
                    column: field,
                    alias,
                })
            })
            .collect(),
        other => {
            let MemberNode { table, field } = lower_member(other)?;
            Ok(vec![Projection::Field {
                table,
                column: field,
                alias: None,
            }])
        }
    }
}

fn template_regex() -> &'static Regex {
    static TEMPLATE_RE: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_RE.get_or_init(|| Regex::new(r"@(\d+)").expect("invalid built-in template regex"))
}

/// Drives a [`SqlQueryBuilder`] from source expressions.
pub struct ExpressionResolver<'a> {
    builder: &'a mut SqlQueryBuilder,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(builder: &'a mut SqlQueryBuilder) -> Self {
        Self { builder }
    }

    /// Resolve a predicate into the condition clause.
    pub fn resolve_query(&mut self, predicate: &Expr) -> SqlBuildResult<()> {
        let node = resolve(predicate)?;
        emit::emit(self.builder, &node)
    }

    /// Add a projection to the selection list.
    pub fn select(&mut self, projection: &Expr) -> SqlBuildResult<()> {
        for entry in self::projection(projection)? {
            match entry {
                Projection::All(table) => {
                    self.builder.select_all(table);
                }
                Projection::Field {
                    table,
                    column,
                    alias,
                } => {
                    self.builder.select_field(&table, &column, alias.as_deref());
                }
            }
        }
        Ok(())
    }

    /// Add `FUNC(field)` entries to the selection list.
    pub fn select_with_function(&mut self, function: &str, projection: &Expr) -> SqlBuildResult<()> {
        for entry in self::projection(projection)? {
            match entry {
                Projection::All(_) => {
                    return Err(SqlBuildError::unsupported(format!(
                        "Parameter: {function} needs a column, not a whole row"
                    )));
                }
                Projection::Field {
                    table,
                    column,
                    alias,
                } => {
                    self.builder
                        .select_aggregate(function, &table, &column, alias.as_deref());
                }
            }
        }
        Ok(())
    }

    pub fn order_by(&mut self, key: &Expr, descending: bool) -> SqlBuildResult<()> {
        let member = lower_member(key)?;
        self.builder.order_by(&member.table, &member.field, descending);
        Ok(())
    }

    pub fn group_by(&mut self, key: &Expr) -> SqlBuildResult<()> {
        let member = lower_member(key)?;
        self.builder.group_by(&member.table, &member.field);
        Ok(())
    }

    /// `HAVING FUNC(key) op value`
    pub fn having(
        &mut self,
        function: &str,
        key: &Expr,
        op: BinaryOp,
        value: Value,
    ) -> SqlBuildResult<()> {
        if !op.is_comparison() {
            return Err(SqlBuildError::unsupported(format!(
                "Binary: HAVING needs a comparison operator, not {op}"
            )));
        }
        let member = lower_member(key)?;
        self.builder
            .having(function, &member.table, &member.field, op, value);
        Ok(())
    }

    /// Join `table` on a predicate over both entities.
    pub fn join(&mut self, kind: JoinKind, table: &str, on: &Expr) -> SqlBuildResult<()> {
        let mut condition = self.builder.fork(table, SqlOperation::Case);
        ExpressionResolver::new(&mut condition).resolve_query(on)?;
        self.builder.join(kind, table, &condition)?;
        Ok(())
    }

    /// `key [NOT ]IN (values...)`
    pub fn query_by_is_in(&mut self, key: &Expr, values: Vec<Value>, negate: bool) -> SqlBuildResult<()> {
        let member = lower_member(key)?;
        if negate {
            self.builder.field_not_in(&member.table, &member.field, values);
        } else {
            self.builder.field_is_in(&member.table, &member.field, values);
        }
        Ok(())
    }

    /// `key [NOT ]IN (sub-query)`
    pub fn query_by_is_in_query(
        &mut self,
        key: &Expr,
        query: &SqlQueryBuilder,
        negate: bool,
    ) -> SqlBuildResult<()> {
        let member = lower_member(key)?;
        self.builder
            .field_is_in_query(&member.table, &member.field, query, negate)?;
        Ok(())
    }

    /// `(key [NOT ]BETWEEN start AND end)`
    pub fn query_between(
        &mut self,
        key: &Expr,
        start: Value,
        end: Value,
        negate: bool,
    ) -> SqlBuildResult<()> {
        let member = lower_member(key)?;
        self.builder
            .field_between(&member.table, &member.field, start, end, negate);
        Ok(())
    }

    /// Splice a raw condition template.
    ///
    /// `@0`, `@1`, ... refer to `args` by position and may repeat. Each
    /// argument is rendered once, in order: column references become quoted
    /// names, values become parameters.
    pub fn resolve_raw(&mut self, template: &str, args: &[Expr]) -> SqlBuildResult<()> {
        for caps in template_regex().captures_iter(template) {
            let index = caps[1].parse::<usize>().ok().filter(|i| *i < args.len());
            if index.is_none() {
                return Err(SqlBuildError::argument(format!(
                    "template placeholder {} has no matching argument ({} given)",
                    &caps[0],
                    args.len()
                )));
            }
        }

        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            let mut part = self.builder.fork(self.builder.table_name(), SqlOperation::Case);
            ExpressionResolver::new(&mut part).resolve_query(arg)?;
            rendered.push(part.condition_text());
            self.builder.absorb(&part)?;
        }

        let text = template_regex().replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| rendered.get(i))
                .cloned()
                .unwrap_or_default()
        });
        self.builder.push_condition(text.into_owned());
        Ok(())
    }

    /// Resolve `SET` assignments from a record of `member: value` entries.
    ///
    /// A call to a registered update method on a column (such as `Replace`)
    /// renders as the matching SQL function; anything else is evaluated.
    pub fn update(&mut self, meta: &EntityMeta, assignments: &Expr) -> SqlBuildResult<()> {
        let Expr::Record(entries) = assignments else {
            return Err(SqlBuildError::unsupported(format!(
                "{}: UPDATE expects a record of assignments",
                assignments.kind()
            )));
        };
        for (name, value) in entries {
            if let Some((column, method, args)) = update_call(value)? {
                let resolver = update::find(method).ok_or_else(|| {
                    SqlBuildError::unsupported(format!(
                        "Call: method '{method}' is not supported in UPDATE"
                    ))
                })?;
                let args = args.iter().map(evaluate).collect::<SqlBuildResult<Vec<_>>>()?;
                resolver.resolve_statement(self.builder, &column, args)?;
            } else {
                let column = meta.column(name);
                let value = evaluate(value)?;
                self.builder.update_field_with(column, value);
            }
        }
        Ok(())
    }

    /// Add one INSERT row from a record of `member: value` entries.
    pub fn insert(&mut self, meta: &EntityMeta, record: &Expr) -> SqlBuildResult<()> {
        let Expr::Record(entries) = record else {
            return Err(SqlBuildError::unsupported(format!(
                "{}: INSERT expects a record of values",
                record.kind()
            )));
        };
        let row = entries
            .iter()
            .map(|(name, value)| -> SqlBuildResult<(String, Value)> {
                Ok((meta.column(name).to_string(), evaluate(value)?))
            })
            .collect::<SqlBuildResult<Vec<_>>>()?;
        self.builder.insert_row(row)?;
        Ok(())
    }

    /// Add one INSERT row from a captured object.
    ///
    /// Members follow the entity's column order when it declares one;
    /// members the entity does not map are ignored.
    pub fn insert_value(&mut self, meta: &EntityMeta, value: &Value) -> SqlBuildResult<()> {
        let Value::Json(serde_json::Value::Object(object)) = value else {
            return Err(SqlBuildError::argument(format!(
                "INSERT expects an object value, got {}",
                value.kind()
            )));
        };
        let row: Vec<(String, Value)> = if meta.columns.is_empty() {
            object
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v.clone())))
                .collect()
        } else {
            meta.columns
                .iter()
                .filter_map(|(member, column)| {
                    object
                        .get(*member)
                        .map(|v| (column.to_string(), Value::from_json(v.clone())))
                })
                .collect()
        };
        self.builder.insert_row(row)?;
        Ok(())
    }
}

/// `(column, method, args)` when `expr` is a method call on a column.
fn update_call(expr: &Expr) -> SqlBuildResult<Option<(String, &str, &[Expr])>> {
    let Expr::Call(call) = expr else {
        return Ok(None);
    };
    if call.eval.is_some() {
        return Ok(None);
    }
    let Some(receiver) = call.receiver.as_deref() else {
        return Ok(None);
    };
    if !matches!(lower::chain_root(receiver), Expr::Parameter(_)) {
        return Ok(None);
    }
    let member = lower_member(receiver)?;
    Ok(Some((member.field, call.method.as_ref(), call.args.as_slice())))
}
