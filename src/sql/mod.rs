//! SQL generation module.
//!
//! A small, type-safe SQL builder that renders multi-dialect SQL with bound
//! parameters:
//!
//! - [`query`] - SELECT query builder and compilation to placeholders
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    col, contains_pattern, count, count_distinct, count_star, escape_like, func, lit_bool,
    lit_float, lit_int, lit_null, lit_str, param, raw_sql, star, table_col, table_star,
    BinaryOperator, Expr, ExprExt, Literal, UnaryOperator, LIKE_ESCAPE,
};
pub use query::{
    CompiledQuery, Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef,
};
pub use token::{Token, TokenStream};
