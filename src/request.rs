//! Grid request parameters and the response envelope.
//!
//! Speaks the legacy server-side processing protocol:
//!
//! | Parameter        | Meaning                                   |
//! |------------------|-------------------------------------------|
//! | `iDisplayStart`  | row offset                                |
//! | `iDisplayLength` | page size, `<= 0` for all rows            |
//! | `iSortCol_0`     | client column to sort by                  |
//! | `sSortDir_0`     | `asc` or `desc`                           |
//! | `sSearch`        | global search term                        |
//! | `sSearch_{i}`    | search term for column `i`                |
//! | `sEcho`          | opaque draw counter, echoed back          |

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::descriptor::SortDirection;
use crate::error::{GridError, GridResult};
use crate::value::Value;

const DISPLAY_START: &str = "iDisplayStart";
const DISPLAY_LENGTH: &str = "iDisplayLength";
const SORT_COLUMN: &str = "iSortCol_0";
const SORT_DIRECTION: &str = "sSortDir_0";
const SEARCH: &str = "sSearch";
const COLUMN_SEARCH_PREFIX: &str = "sSearch_";
const ECHO: &str = "sEcho";

/// Requested sort, in client column terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRequest {
    pub column: usize,
    pub direction: SortDirection,
}

/// One normalised grid request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridRequest {
    pub echo: Option<String>,
    pub offset: u64,
    /// `None` returns every matching row.
    pub limit: Option<u64>,
    /// `None` means no ORDER BY at all, not the configured default.
    pub sort: Option<SortRequest>,
    pub search: String,
    pub column_search: BTreeMap<usize, String>,
}

impl GridRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw request parameters. Unknown names are ignored.
    pub fn from_params<I, K, V>(params: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = GridRequest::new();
        let mut sort_column = None;
        let mut sort_direction = SortDirection::Asc;

        for (name, value) in params {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                DISPLAY_START => {
                    if let Some(n) = parse_int(name, value)? {
                        if n < 0 {
                            warn!(offset = n, "negative {} clamped to 0", DISPLAY_START);
                        }
                        request.offset = n.max(0) as u64;
                    }
                }
                DISPLAY_LENGTH => {
                    if let Some(n) = parse_int(name, value)? {
                        request.limit = (n > 0).then_some(n as u64);
                    }
                }
                SORT_COLUMN => {
                    if let Some(n) = parse_int(name, value)? {
                        if n < 0 {
                            warn!(column = n, "negative {} clamped to 0", SORT_COLUMN);
                        }
                        sort_column = Some(n.max(0) as usize);
                    }
                }
                SORT_DIRECTION => {
                    sort_direction = value.parse().unwrap_or_else(|_| {
                        warn!(direction = value, "unknown {}, sorting ascending", SORT_DIRECTION);
                        SortDirection::Asc
                    });
                }
                SEARCH => request.search = value.to_string(),
                ECHO => request.echo = Some(value.to_string()),
                _ => {
                    if let Some(index) = name
                        .strip_prefix(COLUMN_SEARCH_PREFIX)
                        .and_then(|i| i.parse::<usize>().ok())
                    {
                        request.column_search.insert(index, value.to_string());
                    }
                }
            }
        }

        request.sort = sort_column.map(|column| SortRequest {
            column,
            direction: sort_direction,
        });
        Ok(request)
    }

    /// Page window: `offset` rows skipped, at most `limit` returned.
    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn sort_by(mut self, column: usize, direction: SortDirection) -> Self {
        self.sort = Some(SortRequest { column, direction });
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = term.into();
        self
    }

    pub fn column_search(mut self, index: usize, term: &str) -> Self {
        self.column_search.insert(index, term.into());
        self
    }
}

/// Empty values read as absent; anything else must be an integer.
fn parse_int(name: &str, value: &str) -> GridResult<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| GridError::invalid_param(name, value, "expected an integer"))
}

/// Totals plus the current page, in the legacy wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResponse {
    #[serde(rename = "sEcho", skip_serializing_if = "Option::is_none")]
    pub echo: Option<String>,
    #[serde(rename = "iTotalRecords")]
    pub total_records: u64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_filtered: u64,
    #[serde(rename = "aaData")]
    pub rows: Vec<Vec<Value>>,
}
