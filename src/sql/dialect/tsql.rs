//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL has significant differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - No boolean literals in predicates
//! - N'...' prefix for Unicode strings
//! - `YEAR()`, `MONTH()`, `DAY()` instead of EXTRACT

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::DatePart;
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        // Facet values are arbitrary user text; comparing NVARCHAR columns
        // against a non-N literal silently loses non-Latin characters.
        helpers::quote_string_unicode(s)
    }

    fn emit_date_part(&self, part: DatePart, arg: &TokenStream) -> TokenStream {
        let name = match part {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
        };
        helpers::emit_date_part_function(name, arg)
    }
}
