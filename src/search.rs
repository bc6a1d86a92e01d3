//! Full-text search providers.
//!
//! A provider turns a search term into extra [`QueryParts`] that narrow a
//! facet's base table to matching pages and/or files.

use crate::facet::applied::LIKE_ESCAPE;
use crate::facet::compose::{JoinCondition, QueryParts};
use crate::schema::PAGE_ID_COLUMN;
use crate::sql::{any_of, lit_str, table_col, ExprExt};

/// Page text table.
pub const PAGE_DATA_TABLE: &str = "_pageData";
/// File text table.
pub const FILE_DATA_TABLE: &str = "_fileData";
/// Searchable text column of both text tables.
pub const FULL_TEXT_COLUMN: &str = "_fullText";

/// Supplies the tables, conditions and joins for a full-text search.
pub trait FullTextSearch: Send + Sync {
    fn query_parts(
        &self,
        term: &str,
        base_table: &str,
        searchable_pages: bool,
        searchable_files: bool,
    ) -> QueryParts;
}

/// `%term%` with `%`, `_` and the escape character itself escaped.
pub fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Substring search over the page and file text tables.
///
/// Works on every dialect at the cost of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSearch {
    table_prefix: String,
}

impl LikeSearch {
    pub const fn new() -> Self {
        Self {
            table_prefix: String::new(),
        }
    }

    /// Text tables are named `<prefix>_pageData` / `<prefix>_fileData`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            table_prefix: prefix.to_string(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }
}

impl FullTextSearch for LikeSearch {
    fn query_parts(
        &self,
        term: &str,
        base_table: &str,
        searchable_pages: bool,
        searchable_files: bool,
    ) -> QueryParts {
        let mut parts = QueryParts::empty();
        let pattern = like_contains(term);
        let mut matches = Vec::new();

        let sources = [
            (searchable_pages, PAGE_DATA_TABLE),
            (searchable_files, FILE_DATA_TABLE),
        ];
        for (enabled, name) in sources {
            if !enabled {
                continue;
            }
            let table = self.table(name);
            parts.add_table(&table);
            parts.set_join(
                &table,
                JoinCondition::left(
                    table_col(&table, PAGE_ID_COLUMN).eq(table_col(base_table, PAGE_ID_COLUMN)),
                ),
            );
            matches.push(
                table_col(&table, FULL_TEXT_COLUMN).like_escape(lit_str(&pattern), LIKE_ESCAPE),
            );
        }

        if let Some(condition) = any_of(matches) {
            parts.add_condition(condition);
        }

        parts
    }
}
