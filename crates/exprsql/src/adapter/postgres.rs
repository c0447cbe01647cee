//! PostgreSQL.

use super::ident::{self, QuoteStyle};
use super::{InsertRow, SqlAdapter, insert_values};

const STYLE: QuoteStyle = QuoteStyle::DOUBLE_QUOTE.folding_case();

/// Double-quote identifiers, positional `$n` placeholders, `RETURNING` output.
///
/// Unquoted identifiers are folded to lower case by the server, so any name
/// with upper-case letters is quoted to keep it intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl SqlAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_table(&self, name: &str) -> String {
        ident::quote(name, STYLE)
    }

    fn quote_column(&self, name: &str) -> String {
        ident::quote(name, STYLE)
    }

    fn parameter(&self, _name: &str, index: usize) -> String {
        format!("${index}")
    }

    fn pagination(&self, page_size: Option<u64>, page_index: u64) -> Option<String> {
        match (page_size, page_index) {
            (None, 0) => None,
            (Some(size), 0) => Some(format!("LIMIT {size}")),
            (Some(size), offset) => Some(format!("LIMIT {size} OFFSET {offset}")),
            (None, offset) => Some(format!("OFFSET {offset}")),
        }
    }

    fn insert_command(&self, table: &str, rows: &[InsertRow], output: &[String]) -> String {
        let insert = insert_values(self, table, rows, None);
        if output.is_empty() {
            return insert;
        }
        let returning: Vec<String> = output.iter().map(|c| self.quote_column(c)).collect();
        format!("{insert} RETURNING {}", returning.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_case_names_are_quoted() {
        assert_eq!(PostgresAdapter.field("Users", "Id"), "\"Users\".\"Id\"");
        assert_eq!(PostgresAdapter.field("users", "id"), "users.id");
    }

    #[test]
    fn positional_placeholders() {
        assert_eq!(PostgresAdapter.parameter("Param3", 3), "$3");
    }

    #[test]
    fn pagination_forms() {
        let a = PostgresAdapter;
        assert_eq!(a.pagination(Some(10), 0).as_deref(), Some("LIMIT 10"));
        assert_eq!(a.pagination(Some(10), 20).as_deref(), Some("LIMIT 10 OFFSET 20"));
        assert_eq!(a.pagination(None, 20).as_deref(), Some("OFFSET 20"));
    }

    #[test]
    fn insert_returning() {
        let rows = vec![vec![("email".to_string(), "$1".to_string())]];
        assert_eq!(
            PostgresAdapter.insert_command("users", &rows, &["id".to_string()]),
            "INSERT INTO users (email) VALUES ($1) RETURNING id"
        );
    }
}
