//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible:
//! - ANSI identifier quoting (`"`)
//! - `EXTRACT(part FROM x)` returns BIGINT

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Uses default emit_date_part (EXTRACT ... FROM ...)
}
