//! SQLite SQL dialect.
//!
//! SQLite differences from ANSI:
//! - ANSI identifier quoting (`"`)
//! - Dates are stored as ISO-8601 text, so there is no EXTRACT
//! - Calendar components come from `STRFTIME`, which returns text

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::DatePart;
use crate::sql::token::TokenStream;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn emit_date_part(&self, part: DatePart, arg: &TokenStream) -> TokenStream {
        // STRFTIME yields '03' for March; the cast gives back an integer.
        helpers::emit_date_part_strftime(part, arg)
    }
}
