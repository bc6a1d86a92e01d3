//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::expr::DatePart;
use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: SQLite, Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure Synapse)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: SQLite, Postgres, DuckDB
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with single quotes, also doubling backslashes.
/// Used by: MySQL (backslash is an escape character unless NO_BACKSLASH_ESCAPES)
pub fn quote_string_backslash(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

/// Quote string with N prefix for Unicode (T-SQL).
/// Used by: T-SQL
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Date Components
// =============================================================================

/// Emit `EXTRACT(<part> FROM arg)`.
/// Used by: Postgres, DuckDB
pub fn emit_date_part_extract(part: DatePart, arg: &TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("EXTRACT".into()))
        .lparen()
        .push(Token::Raw(part.keyword().into()))
        .space()
        .push(Token::From)
        .space()
        .append(arg)
        .rparen();
    ts
}

/// Emit a single-argument function call such as `YEAR(arg)`.
/// Used by: MySQL, T-SQL
pub fn emit_date_part_function(name: &str, arg: &TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.into()))
        .lparen()
        .append(arg)
        .rparen();
    ts
}

/// Emit `CAST(STRFTIME('<fmt>', arg) AS INTEGER)`.
/// Used by: SQLite, which stores dates as text and has no EXTRACT.
pub fn emit_date_part_strftime(part: DatePart, arg: &TokenStream) -> TokenStream {
    let format = match part {
        DatePart::Year => "%Y",
        DatePart::Month => "%m",
        DatePart::Day => "%d",
    };

    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("CAST".into()))
        .lparen()
        .push(Token::FunctionName("STRFTIME".into()))
        .lparen()
        .push(Token::LitString(format.into()))
        .comma()
        .space()
        .append(arg)
        .rparen()
        .space()
        .push(Token::As)
        .space()
        .push(Token::Raw("INTEGER".into()))
        .rparen();
    ts
}
