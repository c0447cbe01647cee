//! Clause builder.
//!
//! A [`SqlQueryBuilder`] accumulates already-rendered SQL fragments and the
//! parameters they reference. The resolver drives it by calling the
//! primitives below in tree-traversal order, so emission order is text order.
//!
//! ## Design
//!
//! - Identifiers go through the dialect adapter as they are pushed.
//! - Every value gets a fresh name `{prefix}{n}`; `n` never goes backwards,
//!   including across clones and sub-builders.
//! - Rendering of the full command lives in [`command`].

pub mod command;

use crate::adapter::{InsertRow, SqlAdapter};
use crate::error::{SqlBuildError, SqlBuildResult};
use crate::expr::BinaryOp;
use crate::param::Parameters;
use crate::value::Value;
use std::sync::Arc;

/// Default parameter name prefix.
pub const DEFAULT_PARAMETER_PREFIX: &str = "Param";

/// Statement kind the builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlOperation {
    #[default]
    Select,
    Count,
    Insert,
    InsertFrom,
    Update,
    Delete,
    /// Bare condition text; used for raw predicates and join conditions.
    Case,
}

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// Mutable per-query accumulator of SQL fragments and parameters.
#[derive(Debug, Clone)]
#[must_use]
pub struct SqlQueryBuilder {
    adapter: Arc<dyn SqlAdapter>,
    prefix: String,
    operation: SqlOperation,
    table_names: Vec<String>,
    join_expressions: Vec<String>,
    selection_list: Vec<String>,
    where_conditions: Vec<String>,
    order_by_list: Vec<String>,
    group_by_list: Vec<String>,
    having_conditions: Vec<String>,
    update_values: Vec<String>,
    insert_rows: Vec<InsertRow>,
    insert_output: Vec<String>,
    split_columns: Vec<String>,
    parameters: Parameters,
    current_param_index: usize,
    /// Ids issued before this statement began; positional placeholders count
    /// from here.
    start_index: usize,
    page_size: Option<u64>,
    page_index: u64,
}

impl SqlQueryBuilder {
    /// Create a builder for `table` rendering through `adapter`.
    pub fn new(table: impl Into<String>, adapter: Arc<dyn SqlAdapter>) -> Self {
        Self {
            adapter,
            prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
            operation: SqlOperation::Select,
            table_names: vec![table.into()],
            join_expressions: Vec::new(),
            selection_list: Vec::new(),
            where_conditions: Vec::new(),
            order_by_list: Vec::new(),
            group_by_list: Vec::new(),
            having_conditions: Vec::new(),
            update_values: Vec::new(),
            insert_rows: Vec::new(),
            insert_output: Vec::new(),
            split_columns: Vec::new(),
            parameters: Parameters::new(),
            current_param_index: 0,
            start_index: 0,
            page_size: None,
            page_index: 0,
        }
    }

    /// Like [`SqlQueryBuilder::new`], but fails without an adapter.
    pub fn try_new(
        table: impl Into<String>,
        adapter: Option<Arc<dyn SqlAdapter>>,
    ) -> SqlBuildResult<Self> {
        let adapter = adapter.ok_or_else(|| {
            SqlBuildError::configuration(
                "no SQL adapter configured; set a dialect on the SqlContext first",
            )
        })?;
        Ok(Self::new(table, adapter))
    }

    /// Use a different parameter name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Continue numbering after `index` values already issued elsewhere.
    pub fn starting_at(mut self, index: usize) -> Self {
        self.current_param_index = index;
        self.start_index = index;
        self
    }

    /// A fresh builder sharing adapter, prefix and counter, for text that is
    /// spliced back into this one (raw predicates, join conditions, sub-queries).
    pub fn fork(&self, table: impl Into<String>, operation: SqlOperation) -> Self {
        let mut sub = Self::new(table, Arc::clone(&self.adapter))
            .with_prefix(self.prefix.clone())
            .starting_at(self.current_param_index);
        sub.start_index = self.start_index;
        sub.operation = operation;
        sub
    }

    /// Take over the parameters and counter of a forked builder.
    ///
    /// Fails when `sub` reuses a parameter name this builder already holds,
    /// which happens when it was not forked from this builder.
    pub fn absorb(&mut self, sub: &SqlQueryBuilder) -> SqlBuildResult<()> {
        if let Some(name) = sub.parameters.names().find(|n| self.parameters.contains(n)) {
            return Err(SqlBuildError::argument(format!(
                "parameter '{name}' is already bound; fork sub-queries from the builder they join"
            )));
        }
        self.parameters.extend(&sub.parameters);
        self.current_param_index = self.current_param_index.max(sub.current_param_index);
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn adapter(&self) -> &Arc<dyn SqlAdapter> {
        &self.adapter
    }

    pub fn operation(&self) -> SqlOperation {
        self.operation
    }

    pub fn set_operation(&mut self, operation: SqlOperation) -> &mut Self {
        self.operation = operation;
        self
    }

    pub fn parameter_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Number of parameter ids issued so far.
    pub fn current_param_index(&self) -> usize {
        self.current_param_index
    }

    /// Primary table.
    pub fn table_name(&self) -> &str {
        self.table_names.first().map(String::as_str).unwrap_or_default()
    }

    pub fn table_names(&self) -> &[String] {
        &self.table_names
    }

    pub fn has_conditions(&self) -> bool {
        !self.where_conditions.is_empty()
    }

    pub fn page_size(&self) -> Option<u64> {
        self.page_size
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    // ==================== Parameters ====================

    /// Issue the next parameter name.
    pub fn next_param_id(&mut self) -> String {
        self.current_param_index += 1;
        format!("{}{}", self.prefix, self.current_param_index)
    }

    /// Store a named parameter; a name that already exists keeps its value.
    pub fn add_parameter(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.parameters.add(name, value)
    }

    /// Register `value` under a fresh name and return its placeholder.
    ///
    /// Names keep counting across a batch; the positional index handed to the
    /// adapter restarts at 1 for every statement.
    pub fn bind(&mut self, value: Value) -> String {
        let name = self.next_param_id();
        let position = self.current_param_index - self.start_index;
        let placeholder = self.adapter.parameter(&name, position);
        self.add_parameter(name, value);
        placeholder
    }

    fn field(&self, table: &str, field: &str) -> String {
        self.adapter.field(table, field)
    }

    // ==================== Conditions ====================

    /// Append raw text to the condition clause.
    pub fn push_condition(&mut self, text: impl Into<String>) -> &mut Self {
        self.where_conditions.push(text.into());
        self
    }

    pub fn begin_expression(&mut self) -> &mut Self {
        self.push_condition("(")
    }

    pub fn end_expression(&mut self) -> &mut Self {
        self.push_condition(")")
    }

    pub fn and(&mut self) -> &mut Self {
        self.push_condition(" AND ")
    }

    pub fn or(&mut self) -> &mut Self {
        self.push_condition(" OR ")
    }

    pub fn not(&mut self) -> &mut Self {
        self.push_condition("NOT ")
    }

    /// ` op ` between two operands of a generic pair.
    pub fn comparison_operator(&mut self, op: BinaryOp) -> &mut Self {
        self.push_condition(format!(" {} ", op.sql()))
    }

    /// Bare `table.field`.
    pub fn field_reference(&mut self, table: &str, field: &str) -> &mut Self {
        let field = self.field(table, field);
        self.push_condition(field)
    }

    /// `table.field op @p`
    pub fn field_comparison(
        &mut self,
        table: &str,
        field: &str,
        op: BinaryOp,
        value: Value,
    ) -> &mut Self {
        let column = self.field(table, field);
        let placeholder = self.bind(value);
        self.push_condition(format!("{column} {} {placeholder}", op.sql()))
    }

    /// `t1.f1 op t2.f2`
    pub fn field_to_field_comparison(
        &mut self,
        left_table: &str,
        left_field: &str,
        op: BinaryOp,
        right_table: &str,
        right_field: &str,
    ) -> &mut Self {
        let left = self.field(left_table, left_field);
        let right = self.field(right_table, right_field);
        self.push_condition(format!("{left} {} {right}", op.sql()))
    }

    /// `table.field LIKE @p`; `pattern` already carries its wildcards.
    pub fn field_like(&mut self, table: &str, field: &str, pattern: impl Into<String>) -> &mut Self {
        let column = self.field(table, field);
        let placeholder = self.bind(Value::Text(pattern.into()));
        self.push_condition(format!("{column} LIKE {placeholder}"))
    }

    pub fn field_is_null(&mut self, table: &str, field: &str) -> &mut Self {
        let column = self.field(table, field);
        self.push_condition(format!("{column} IS NULL"))
    }

    pub fn field_is_not_null(&mut self, table: &str, field: &str) -> &mut Self {
        let column = self.field(table, field);
        self.push_condition(format!("{column} IS NOT NULL"))
    }

    /// A bare placeholder for a value operand.
    pub fn constant(&mut self, value: Value) -> &mut Self {
        let placeholder = self.bind(value);
        self.push_condition(placeholder)
    }

    /// `table.field IN (@p1,@p2,...)`, one parameter per value.
    ///
    /// An empty list can never match and renders `1=0`.
    pub fn field_is_in(&mut self, table: &str, field: &str, values: Vec<Value>) -> &mut Self {
        self.field_in_list(table, field, values, false)
    }

    /// `table.field NOT IN (...)`; an empty list renders `1=1`.
    pub fn field_not_in(&mut self, table: &str, field: &str, values: Vec<Value>) -> &mut Self {
        self.field_in_list(table, field, values, true)
    }

    fn field_in_list(
        &mut self,
        table: &str,
        field: &str,
        values: Vec<Value>,
        negate: bool,
    ) -> &mut Self {
        if values.is_empty() {
            return self.push_condition(if negate { "1=1" } else { "1=0" });
        }
        let column = self.field(table, field);
        let placeholders: Vec<String> = values.into_iter().map(|v| self.bind(v)).collect();
        let keyword = if negate { "NOT IN" } else { "IN" };
        self.push_condition(format!("{column} {keyword} ({})", placeholders.join(",")))
    }

    /// `table.field [NOT ]IN (sub-query)`.
    ///
    /// The sub-query must have been forked from this builder so its
    /// parameter numbering continues this one's; a name clash is an error.
    pub fn field_is_in_query(
        &mut self,
        table: &str,
        field: &str,
        query: &SqlQueryBuilder,
        negate: bool,
    ) -> SqlBuildResult<&mut Self> {
        let column = self.field(table, field);
        let text = query.command_text()?;
        self.absorb(query)?;
        let keyword = if negate { "NOT IN" } else { "IN" };
        Ok(self.push_condition(format!("{column} {keyword} ({text})")))
    }

    /// `(table.field [NOT ]BETWEEN @p1 AND @p2)`
    pub fn field_between(
        &mut self,
        table: &str,
        field: &str,
        start: Value,
        end: Value,
        negate: bool,
    ) -> &mut Self {
        let column = self.field(table, field);
        let low = self.bind(start);
        let high = self.bind(end);
        let keyword = if negate { "NOT BETWEEN" } else { "BETWEEN" };
        self.push_condition(format!("({column} {keyword} {low} AND {high})"))
    }

    // ==================== Selection ====================

    fn push_selection(&mut self, expression: String, alias: Option<&str>) -> &mut Self {
        let entry = match alias {
            Some(alias) => format!("{expression} AS {}", self.adapter.quote_column(alias)),
            None => expression,
        };
        self.selection_list.push(entry);
        self
    }

    /// `table.field [AS alias]`
    pub fn select_field(&mut self, table: &str, field: &str, alias: Option<&str>) -> &mut Self {
        let column = self.field(table, field);
        self.push_selection(column, alias)
    }

    /// `FUNC(table.field) [AS alias]`
    pub fn select_aggregate(
        &mut self,
        function: &str,
        table: &str,
        field: &str,
        alias: Option<&str>,
    ) -> &mut Self {
        let column = self.field(table, field);
        self.push_selection(format!("{function}({column})"), alias)
    }

    /// `table.*`
    pub fn select_all(&mut self, table: &str) -> &mut Self {
        let table = self.adapter.quote_table(table);
        self.selection_list.push(format!("{table}.*"));
        self
    }

    // ==================== Ordering / grouping ====================

    pub fn order_by(&mut self, table: &str, field: &str, descending: bool) -> &mut Self {
        let column = self.field(table, field);
        self.order_by_list.push(if descending {
            format!("{column} DESC")
        } else {
            column
        });
        self
    }

    pub fn group_by(&mut self, table: &str, field: &str) -> &mut Self {
        let column = self.field(table, field);
        self.group_by_list.push(column);
        self
    }

    /// `FUNC(table.field) op @p` into the HAVING clause; several are ANDed.
    pub fn having(
        &mut self,
        function: &str,
        table: &str,
        field: &str,
        op: BinaryOp,
        value: Value,
    ) -> &mut Self {
        let column = self.field(table, field);
        let placeholder = self.bind(value);
        self.having_conditions
            .push(format!("{function}({column}) {} {placeholder}", op.sql()));
        self
    }

    // ==================== Pagination ====================

    pub fn take(&mut self, size: u64) -> &mut Self {
        self.page_size = Some(size);
        self
    }

    /// Row offset.
    pub fn skip(&mut self, offset: u64) -> &mut Self {
        self.page_index = offset;
        self
    }

    /// Zero-based page `index` of `size` rows.
    pub fn page(&mut self, index: u64, size: u64) -> &mut Self {
        self.page_size = Some(size);
        self.page_index = index.saturating_mul(size);
        self
    }

    // ==================== Joins ====================

    /// `KIND JOIN table ON condition`, taking the condition's parameters.
    pub fn join(
        &mut self,
        kind: JoinKind,
        table: &str,
        on: &SqlQueryBuilder,
    ) -> SqlBuildResult<&mut Self> {
        let condition = on.condition_text();
        self.absorb(on)?;
        let quoted = self.adapter.quote_table(table);
        self.table_names.push(table.to_string());
        self.join_expressions
            .push(format!("{} {quoted} ON {condition}", kind.sql()));
        Ok(self)
    }

    // ==================== Update ====================

    /// Append a raw `SET` entry.
    pub fn push_update_value(&mut self, text: impl Into<String>) -> &mut Self {
        self.update_values.push(text.into());
        self
    }

    /// `column = @p`
    pub fn update_field_with(&mut self, field: &str, value: Value) -> &mut Self {
        let column = self.adapter.quote_column(field);
        let placeholder = self.bind(value);
        self.push_update_value(format!("{column} = {placeholder}"))
    }

    /// `column = REPLACE(column, @p1, @p2)`
    pub fn update_field_replace_string(&mut self, field: &str, old: Value, new: Value) -> &mut Self {
        let column = self.adapter.quote_column(field);
        let from = self.bind(old);
        let to = self.bind(new);
        self.push_update_value(format!("{column} = REPLACE({column}, {from}, {to})"))
    }

    // ==================== Insert ====================

    /// One row of `(column, value)` pairs; each value gets a parameter.
    pub fn insert_row(&mut self, values: Vec<(String, Value)>) -> SqlBuildResult<&mut Self> {
        if values.is_empty() {
            return Err(SqlBuildError::argument("insert row has no columns"));
        }
        if let Some(first) = self.insert_rows.first() {
            let same = first.len() == values.len()
                && first.iter().zip(&values).all(|((a, _), (b, _))| a == b);
            if !same {
                return Err(SqlBuildError::argument(
                    "insert rows must list the same columns in the same order",
                ));
            }
        }
        let row = values
            .into_iter()
            .map(|(column, value)| {
                let placeholder = self.bind(value);
                (column, placeholder)
            })
            .collect();
        self.insert_rows.push(row);
        Ok(self)
    }

    /// Columns returned from an INSERT.
    pub fn insert_output(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.insert_output.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Switch to `INSERT INTO target (columns) SELECT ...`; the current
    /// selection and conditions become the SELECT part.
    pub fn insert_from(
        &mut self,
        target: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.operation = SqlOperation::InsertFrom;
        self.table_names.push(target.into());
        self.split_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests;
