//! Data engine collaborator.
//!
//! The engine composes [`CompiledQuery`] values; an executor runs them and
//! hands back either a scalar count or column-labelled [`Record`]s.

mod sqlite;

pub use sqlite::SqliteExecutor;

use thiserror::Error;

use crate::sql::{CompiledQuery, Dialect};
use crate::value::Record;

/// Result type for executor operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors raised by the data engine.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The engine returned a value the grid cannot represent.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Runs compiled queries against a data engine.
///
/// Implementations own (or borrow) a connection; the engine never retries.
pub trait QueryExecutor {
    /// Dialect the engine expects SQL in.
    fn dialect(&self) -> Dialect;

    /// Run a single-row, single-column count query.
    fn count(&self, query: &CompiledQuery) -> ExecResult<u64>;

    /// Run a query and return every row, labelled by result column name.
    fn fetch(&self, query: &CompiledQuery) -> ExecResult<Vec<Record>>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn count(&self, query: &CompiledQuery) -> ExecResult<u64> {
        (**self).count(query)
    }

    fn fetch(&self, query: &CompiledQuery) -> ExecResult<Vec<Record>> {
        (**self).fetch(query)
    }
}
