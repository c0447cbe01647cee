//! Microsoft SQL Server.

use super::ident::{self, QuoteStyle};
use super::{InsertRow, QueryParts, SqlAdapter, insert_values, join_clauses};

/// Bracket quoting on every identifier, `@name` placeholders,
/// `OFFSET .. FETCH NEXT` paging and `OUTPUT INSERTED` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerAdapter;

impl SqlAdapter for SqlServerAdapter {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_table(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::BRACKET)
    }

    fn quote_column(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::BRACKET)
    }

    fn pagination(&self, page_size: Option<u64>, page_index: u64) -> Option<String> {
        match (page_size, page_index) {
            (None, 0) => None,
            (Some(size), offset) => Some(format!(
                "OFFSET {offset} ROWS FETCH NEXT {size} ROWS ONLY"
            )),
            (None, offset) => Some(format!("OFFSET {offset} ROWS")),
        }
    }

    /// `OFFSET` requires an `ORDER BY`; a neutral one is supplied when the
    /// query has none.
    fn query_string(&self, parts: &QueryParts<'_>) -> String {
        let select = format!("SELECT {} FROM {}", parts.selection, parts.source);
        let page = self.pagination(parts.page_size, parts.page_index);
        let order = match (&page, parts.order.is_empty()) {
            (Some(_), true) => "ORDER BY (SELECT NULL)",
            _ => parts.order,
        };
        join_clauses(&[
            select.as_str(),
            parts.conditions,
            parts.grouping,
            parts.having,
            order,
            page.as_deref().unwrap_or(""),
        ])
    }

    fn insert_command(&self, table: &str, rows: &[InsertRow], output: &[String]) -> String {
        if output.is_empty() {
            return insert_values(self, table, rows, None);
        }
        let inserted: Vec<String> = output
            .iter()
            .map(|c| format!("INSERTED.{}", self.quote_column(c)))
            .collect();
        let clause = format!("OUTPUT {}", inserted.join(", "));
        insert_values(self, table, rows, Some(&clause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_identifier_is_bracketed() {
        assert_eq!(SqlServerAdapter.field("Users", "Id"), "[Users].[Id]");
        assert_eq!(SqlServerAdapter.quote_table("dbo.Users"), "[dbo].[Users]");
    }

    #[test]
    fn paging_without_order_gets_neutral_order() {
        let sql = SqlServerAdapter.query_string(&QueryParts {
            selection: "[Users].*",
            source: "[Users]",
            page_size: Some(10),
            page_index: 20,
            ..QueryParts::default()
        });
        assert_eq!(
            sql,
            "SELECT [Users].* FROM [Users] ORDER BY (SELECT NULL) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn insert_output_inserted() {
        let rows = vec![vec![("Email".to_string(), "@Param1".to_string())]];
        assert_eq!(
            SqlServerAdapter.insert_command("[Users]", &rows, &["Id".to_string()]),
            "INSERT INTO [Users] ([Email]) OUTPUT INSERTED.[Id] VALUES (@Param1)"
        );
    }
}
