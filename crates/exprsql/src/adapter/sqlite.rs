//! SQLite.

use super::ident::{self, QuoteStyle};
use super::{InsertRow, SqlAdapter, insert_values};

/// Double-quote identifiers, `@name` placeholders, `RETURNING` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl SqlAdapter for SqliteAdapter {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_table(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::DOUBLE_QUOTE)
    }

    fn quote_column(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::DOUBLE_QUOTE)
    }

    fn pagination(&self, page_size: Option<u64>, page_index: u64) -> Option<String> {
        match (page_size, page_index) {
            (None, 0) => None,
            (Some(size), 0) => Some(format!("LIMIT {size}")),
            (Some(size), offset) => Some(format!("LIMIT {offset}, {size}")),
            // A negative limit means "no limit"
            (None, offset) => Some(format!("LIMIT -1 OFFSET {offset}")),
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
    fn pagination_forms() {
        let a = SqliteAdapter;
        assert_eq!(a.pagination(Some(10), 0).as_deref(), Some("LIMIT 10"));
        assert_eq!(a.pagination(Some(10), 20).as_deref(), Some("LIMIT 20, 10"));
        assert_eq!(a.pagination(None, 20).as_deref(), Some("LIMIT -1 OFFSET 20"));
    }

    #[test]
    fn reserved_names_are_quoted() {
        assert_eq!(SqliteAdapter.field("Users", "group"), "Users.\"group\"");
    }
}
