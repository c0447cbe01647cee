//! MySQL / MariaDB.

use super::ident::{self, QuoteStyle};
use super::{InsertRow, SqlAdapter, insert_values};

/// Largest row count MySQL accepts; stands in for "no limit" when only an
/// offset is given.
const MAX_ROWS: u64 = u64::MAX;

/// Backtick quoting, `@name` placeholders, `LIMIT offset, size` paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlAdapter;

impl SqlAdapter for MySqlAdapter {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_table(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::BACKTICK)
    }

    fn quote_column(&self, name: &str) -> String {
        ident::quote(name, QuoteStyle::BACKTICK)
    }

    fn pagination(&self, page_size: Option<u64>, page_index: u64) -> Option<String> {
        match (page_size, page_index) {
            (None, 0) => None,
            (Some(size), 0) => Some(format!("LIMIT {size}")),
            (Some(size), offset) => Some(format!("LIMIT {offset}, {size}")),
            (None, offset) => Some(format!("LIMIT {offset}, {MAX_ROWS}")),
        }
    }

    /// MySQL has no `RETURNING`; requested output is read back with
    /// `LAST_INSERT_ID()` in a second statement.
    fn insert_command(&self, table: &str, rows: &[InsertRow], output: &[String]) -> String {
        let insert = insert_values(self, table, rows, None);
        if output.is_empty() {
            insert
        } else {
            format!("{insert}; SELECT LAST_INSERT_ID()")
        }
    }
}
