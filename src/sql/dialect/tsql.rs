//! T-SQL (SQL Server) dialect.
//!
//! T-SQL features:
//! - Square bracket identifier quoting (`[name]`)
//! - N'...' prefix for Unicode strings
//! - BIT type for booleans (1/0)
//! - `@P1`, `@P2`, ... bind parameters
//! - OFFSET/FETCH instead of LIMIT, which needs an ORDER BY

use super::helpers;
use super::SqlDialect;
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
        helpers::quote_string_unicode(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{}", index + 1)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }
}
