//! # Gridview
//!
//! Server-side query engine for paginated, sortable, searchable data grids.
//!
//! ## Architecture
//!
//! A view is configured once and answers many requests:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        QueryDescriptor (root, fields, joins, search)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [GridRequest]
//! ┌─────────────────────────────────────────────────────────┐
//! │   GridView: count / filtered count / data page queries   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │          CompiledQuery (SQL + bound parameters)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryExecutor]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Records ──► rows in projection order            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gridview::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = QueryDescriptor::builder()
//!     .root("users", "u")
//!     .projection(vec![
//!         Field::parse("Name", "u.name")?,
//!         Field::parse("Email", "u.email")?,
//!     ])
//!     .identifier(table_col("u", "id"))
//!     .search(true)
//!     .searchable_columns([0, 1])
//!     .build()?;
//!
//! let executor = SqliteExecutor::open("app.db")?;
//! let request = GridRequest::new().page(0, 10).search("ann");
//! let response = GridView::new(descriptor).respond(&executor, &request)?;
//! println!("{}", serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod request;
pub mod sql;
pub mod value;

pub use descriptor::{Field, QueryDescriptor, QueryDescriptorBuilder};
pub use engine::GridView;
pub use error::{GridError, GridResult};
pub use request::{GridRequest, GridResponse};
pub use value::{Params, Record, Value};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::descriptor::{
        bind, Field, JoinKind, JoinSpec, QueryDescriptor, Relation, SearchPath, SelectorColumn,
        SortDirection,
    };
    pub use crate::engine::{GridView, Page, PreparedQuery, SequentialAliases};
    pub use crate::error::{GridError, GridResult};
    pub use crate::executor::{QueryExecutor, SqliteExecutor};
    pub use crate::request::{GridRequest, GridResponse};
    pub use crate::sql::{col, raw_sql, table_col, Dialect, Expr, ExprExt};
    pub use crate::value::{Params, Record, Value};
}
