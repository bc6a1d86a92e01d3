//! Bundled SQLite executor.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use super::{ExecutionError, QueryExecutor, Row, Value};
use crate::sql::{Dialect, Query};

/// Executes queries against a SQLite database through `rusqlite`.
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExecutionError> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, ExecutionError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection, e.g. for loading data.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl QueryExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn fetch_all(&self, query: &Query) -> Result<Vec<Row>, ExecutionError> {
        let sql = query.to_sql(Dialect::Sqlite);
        debug!(%sql, "executing query");

        let mut stmt = self.conn.prepare(&sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(convert(row.get_ref(i)?));
            }
            out.push(values);
        }

        debug!(rows = out.len(), "query finished");
        Ok(out)
    }
}

fn convert(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
