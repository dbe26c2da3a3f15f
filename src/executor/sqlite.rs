//! SQLite executor backed by rusqlite.

use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use tracing::{debug, instrument};

use super::{ExecError, ExecResult, QueryExecutor};
use crate::sql::{CompiledQuery, Dialect};
use crate::value::{Record, Value};

/// Executes grid queries on a SQLite connection.
///
/// `LIKE` is switched to case-sensitive matching on open so "contains"
/// predicates behave the same as on other engines.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> ExecResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ExecResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> ExecResult<Self> {
        conn.execute_batch("PRAGMA case_sensitive_like = ON;")?;
        Ok(Self { conn })
    }

    /// Underlying connection, for seeding and ad-hoc statements.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl QueryExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    #[instrument(skip_all, fields(params = query.params.len()))]
    fn count(&self, query: &CompiledQuery) -> ExecResult<u64> {
        debug!(sql = %query.sql, "running count query");
        let n: i64 = self
            .conn
            .query_row(&query.sql, params_from_iter(query.params.iter()), |row| {
                row.get(0)
            })?;
        u64::try_from(n).map_err(|_| ExecError::UnsupportedValue(format!("negative count {}", n)))
    }

    #[instrument(skip_all, fields(params = query.params.len()))]
    fn fetch(&self, query: &CompiledQuery) -> ExecResult<Vec<Record>> {
        debug!(sql = %query.sql, "running data query");
        let mut stmt = self.conn.prepare(&query.sql)?;
        let labels: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, label) in labels.iter().enumerate() {
                record.push(label.clone(), from_sql(row.get_ref(i)?)?);
            }
            records.push(record);
        }

        debug!(rows = records.len(), "fetched rows");
        Ok(records)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Value::Float(x) => ToSqlOutput::Owned(SqlValue::Real(*x)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn from_sql(value: ValueRef<'_>) -> ExecResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(x) => Value::Float(x),
        ValueRef::Text(bytes) => Value::Text(
            String::from_utf8(bytes.to_vec())
                .map_err(|e| ExecError::UnsupportedValue(format!("non UTF-8 text: {}", e)))?,
        ),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    })
}
