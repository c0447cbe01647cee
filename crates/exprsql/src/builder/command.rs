//! Command assembly: turning accumulated clause state into SQL text.

use super::{SqlOperation, SqlQueryBuilder};
use crate::adapter::QueryParts;
use crate::error::{SqlBuildError, SqlBuildResult};

impl SqlQueryBuilder {
    /// Condition fragments concatenated verbatim.
    pub fn condition_text(&self) -> String {
        self.where_conditions.concat()
    }

    /// `WHERE ...`, or empty when there are no conditions.
    fn where_clause(&self) -> String {
        if self.where_conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.condition_text())
        }
    }

    /// Tables participating in the SELECT: the primary one plus joins.
    fn source_tables(&self) -> &[String] {
        let count = (1 + self.join_expressions.len()).min(self.table_names.len());
        &self.table_names[..count]
    }

    /// Primary table followed by the join clauses.
    fn source(&self) -> String {
        let mut source = self.adapter.quote_table(self.table_name());
        for join in &self.join_expressions {
            source.push(' ');
            source.push_str(join);
        }
        source
    }

    fn selection(&self) -> String {
        if !self.selection_list.is_empty() {
            return self.selection_list.join(", ");
        }
        if self.operation == SqlOperation::Count {
            return "COUNT(*)".to_string();
        }
        self.source_tables()
            .iter()
            .map(|t| format!("{}.*", self.adapter.quote_table(t)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn list_clause(keyword: &str, items: &[String], separator: &str) -> String {
        if items.is_empty() {
            String::new()
        } else {
            format!("{keyword} {}", items.join(separator))
        }
    }

    fn query_command(&self) -> String {
        let selection = self.selection();
        let source = self.source();
        let conditions = self.where_clause();
        let grouping = Self::list_clause("GROUP BY", &self.group_by_list, ", ");
        let having = Self::list_clause("HAVING", &self.having_conditions, " AND ");
        let order = Self::list_clause("ORDER BY", &self.order_by_list, ", ");

        self.adapter.query_string(&QueryParts {
            selection: &selection,
            source: &source,
            conditions: &conditions,
            grouping: &grouping,
            having: &having,
            order: &order,
            page_size: self.page_size,
            page_index: self.page_index,
        })
    }

    /// Render the full command for the current operation.
    pub fn command_text(&self) -> SqlBuildResult<String> {
        let sql = match self.operation {
            SqlOperation::Select | SqlOperation::Count => self.query_command(),
            SqlOperation::Insert => {
                if self.insert_rows.is_empty() {
                    return Err(SqlBuildError::argument("INSERT requires at least one row"));
                }
                self.adapter
                    .insert_command(&self.insert_target()?, &self.insert_rows, &self.insert_output)
            }
            SqlOperation::InsertFrom => self.adapter.insert_from_command(
                &self.insert_target()?,
                &self.split_columns,
                &self.selection(),
                &self.source(),
                &self.where_clause(),
            ),
            SqlOperation::Update => {
                if self.update_values.is_empty() {
                    return Err(SqlBuildError::argument("UPDATE requires at least one value"));
                }
                self.adapter.update_command(
                    &self.update_values.join(", "),
                    &self.source(),
                    &self.where_clause(),
                )
            }
            SqlOperation::Delete => self
                .adapter
                .delete_command(&self.source(), &self.where_clause()),
            SqlOperation::Case => self.condition_text(),
        };

        crate::trace::command_rendered(self.operation, self.parameters.len(), &sql);
        Ok(sql)
    }

    /// Only the `WHERE ...` part of a SELECT or COUNT.
    pub fn where_command_text(&self) -> SqlBuildResult<String> {
        match self.operation {
            SqlOperation::Select | SqlOperation::Count => Ok(self.where_clause()),
            other => Err(SqlBuildError::invalid_operation(format!(
                "WHERE text is only available for SELECT and COUNT, not {other:?}"
            ))),
        }
    }

    /// Quoted table an INSERT writes to.
    pub fn insert_target(&self) -> SqlBuildResult<String> {
        let table = match self.operation {
            SqlOperation::Insert => self.table_names.first(),
            SqlOperation::InsertFrom => self.table_names.last(),
            other => {
                return Err(SqlBuildError::invalid_operation(format!(
                    "insert target is only available for INSERT statements, not {other:?}"
                )));
            }
        };
        Ok(self.adapter.quote_table(table.map(String::as_str).unwrap_or_default()))
    }
}
