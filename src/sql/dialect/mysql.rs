//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Backslash is an escape character inside string literals
//! - Dedicated date functions: `YEAR()`, `MONTH()`, `DAYOFMONTH()`

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::DatePart;
use crate::sql::token::TokenStream;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn emit_date_part(&self, part: DatePart, arg: &TokenStream) -> TokenStream {
        let name = match part {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAYOFMONTH",
        };
        helpers::emit_date_part_function(name, arg)
    }
}
