//! Storage collaborator: runs composed queries and hands back typed rows.
//!
//! The facet engine never talks to a database directly. It builds a
//! [`Query`] and asks a [`QueryExecutor`] to run it in the executor's own
//! dialect. Result handles are released before `fetch_all` returns, on the
//! error path too.

pub mod sqlite;

use std::fmt;

use chrono::NaiveDate;

use crate::sql::{Dialect, Query};

pub use sqlite::SqliteExecutor;

/// Error type for query execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unexpected value in column '{column}': {found}")]
    UnexpectedValue { column: String, found: String },
}

/// A single cell of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    /// Backends with a native DATE type may return structured dates.
    Date(NaiveDate),
}

/// A result row, in SELECT-list order.
pub type Row = Vec<Value>;

impl Value {
    /// NULL or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Integer view of the value, accepting numeric text.
    ///
    /// Postgres returns `EXTRACT(...)` as NUMERIC, which arrives as a float.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a row count.
    pub fn as_count(&self, column: &str) -> Result<u64, ExecutionError> {
        self.as_i64()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| ExecutionError::UnexpectedValue {
                column: column.to_string(),
                found: self.to_string(),
            })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Executes SELECT queries against a store.
pub trait QueryExecutor {
    /// Dialect the executor renders queries in.
    fn dialect(&self) -> Dialect;

    /// Run `query` and return every row.
    fn fetch_all(&self, query: &Query) -> Result<Vec<Row>, ExecutionError>;

    /// Run `query` and return the first row, if any.
    fn fetch_one(&self, query: &Query) -> Result<Option<Row>, ExecutionError> {
        Ok(self.fetch_all(query)?.into_iter().next())
    }
}
