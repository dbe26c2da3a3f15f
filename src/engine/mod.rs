//! Tabular query engine.
//!
//! A [`GridView`] answers grid requests for one configured
//! [`QueryDescriptor`]. Every operation starts from a fresh clone of the
//! descriptor's base query, so concurrent requests never share WHERE,
//! ORDER BY or JOIN state.
//!
//! ```text
//! base query ──┬── search ── COUNT(..) ───────────────► total / filtered
//!              └── order ── root.* ── search ── window ─► records ─► rows
//! ```

mod alias;
mod page;
mod search;

pub use alias::{AliasGenerator, RandomAliases, SequentialAliases};

use tracing::{debug, instrument};

use crate::descriptor::QueryDescriptor;
use crate::error::GridResult;
use crate::executor::QueryExecutor;
use crate::request::{GridRequest, GridResponse};
use crate::sql::{count, count_distinct, CompiledQuery, Dialect, Query};
use crate::value::{Params, Record, Value};

/// Post-processes a flattened row with access to the full record.
pub type RowRenderer = dyn Fn(&Record, &mut Vec<Value>) + Send + Sync;

/// A composed query and everything it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub query: Query,
    pub params: Params,
    /// Whether any search predicate was added.
    pub searched: bool,
}

impl PreparedQuery {
    pub fn compile(&self, dialect: Dialect) -> GridResult<CompiledQuery> {
        self.query.compile(dialect, &self.params)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Values in projection order, one list per record.
    pub rows: Vec<Vec<Value>>,
    /// Records as fetched, for callers that need every column.
    pub records: Vec<Record>,
}

/// Query engine for one configured view.
pub struct GridView {
    descriptor: QueryDescriptor,
    aliases: Box<dyn AliasGenerator>,
    renderer: Option<Box<RowRenderer>>,
}

impl std::fmt::Debug for GridView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView")
            .field("descriptor", &self.descriptor)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl GridView {
    pub fn new(descriptor: QueryDescriptor) -> Self {
        Self {
            descriptor,
            aliases: Box::new(SequentialAliases),
            renderer: None,
        }
    }

    /// Swap the alias scheme used for search-path joins.
    pub fn with_aliases(mut self, aliases: impl AliasGenerator + 'static) -> Self {
        self.aliases = Box::new(aliases);
        self
    }

    /// Run `renderer` over every flattened row before it is returned.
    pub fn with_renderer(
        mut self,
        renderer: impl Fn(&Record, &mut Vec<Value>) + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    fn with_search(&self, request: &GridRequest, query: Query) -> PreparedQuery {
        let (query, search_params) =
            search::apply_search(&self.descriptor, request, self.aliases.as_ref(), query);
        let searched = !search_params.is_empty();
        let mut params = self.descriptor.params().clone();
        params.extend(search_params);
        PreparedQuery {
            query,
            params,
            searched,
        }
    }

    /// Count query, with the request's search applied when `filtered`.
    ///
    /// Grouping by the identifier counts distinct identifiers; otherwise
    /// identifiers are counted directly. GROUP BY and ORDER BY are dropped
    /// either way.
    pub fn count_query(&self, request: &GridRequest, filtered: bool) -> PreparedQuery {
        let base = self.descriptor.base_query();
        let mut prepared = if filtered {
            self.with_search(request, base)
        } else {
            PreparedQuery {
                query: base,
                params: self.descriptor.params().clone(),
                searched: false,
            }
        };

        let id = self.descriptor.identifier().expr.clone();
        let total = if prepared.query.group_by.contains(&id) {
            count_distinct(id)
        } else {
            count(id)
        };
        prepared.query = prepared
            .query
            .select(vec![total])
            .group_by(Vec::new())
            .order_by(Vec::new());
        prepared
    }

    /// Paginated, ordered and searched data query.
    pub fn data_query(&self, request: &GridRequest) -> GridResult<PreparedQuery> {
        let order = page::resolve_order(&self.descriptor, request)?;
        let query = self
            .descriptor
            .base_query()
            .order_by(order)
            .select(page::data_select(&self.descriptor));

        let mut prepared = self.with_search(request, query);
        if let Some(limit) = request.limit {
            prepared.query = prepared.query.limit(limit).offset(request.offset);
        }
        Ok(prepared)
    }

    /// Rows in the view, ignoring search.
    #[instrument(skip_all, fields(root = %self.descriptor.root_alias()))]
    pub fn count_total<E: QueryExecutor + ?Sized>(&self, executor: &E) -> GridResult<u64> {
        let compiled = self
            .count_query(&GridRequest::new(), false)
            .compile(executor.dialect())?;
        let total = executor.count(&compiled)?;
        debug!(total, "counted rows");
        Ok(total)
    }

    /// Rows matching the request's search.
    #[instrument(skip_all, fields(root = %self.descriptor.root_alias()))]
    pub fn count_filtered<E: QueryExecutor + ?Sized>(
        &self,
        executor: &E,
        request: &GridRequest,
    ) -> GridResult<u64> {
        let compiled = self
            .count_query(request, true)
            .compile(executor.dialect())?;
        let filtered = executor.count(&compiled)?;
        debug!(filtered, "counted matching rows");
        Ok(filtered)
    }

    /// Fetch the requested page and flatten it into projection order.
    #[instrument(skip_all, fields(root = %self.descriptor.root_alias(), offset = request.offset, limit = ?request.limit))]
    pub fn fetch_page<E: QueryExecutor + ?Sized>(
        &self,
        executor: &E,
        request: &GridRequest,
    ) -> GridResult<Page> {
        let compiled = self.data_query(request)?.compile(executor.dialect())?;
        let records = executor.fetch(&compiled)?;

        let fields = self.descriptor.fields();
        let rows = records
            .iter()
            .map(|record| {
                let mut row = page::flatten(fields, record)?;
                if let Some(render) = &self.renderer {
                    render(record, &mut row);
                }
                Ok(row)
            })
            .collect::<GridResult<Vec<_>>>()?;

        debug!(rows = rows.len(), "fetched page");
        Ok(Page { rows, records })
    }

    /// Totals and the requested page in one response.
    #[instrument(skip_all, fields(root = %self.descriptor.root_alias()))]
    pub fn respond<E: QueryExecutor + ?Sized>(
        &self,
        executor: &E,
        request: &GridRequest,
    ) -> GridResult<GridResponse> {
        let total_records = self.count_total(executor)?;
        let filtered = self.count_query(request, true);
        let total_filtered = if filtered.searched {
            executor.count(&filtered.compile(executor.dialect())?)?
        } else {
            total_records
        };
        let page = self.fetch_page(executor, request)?;

        Ok(GridResponse {
            echo: request.echo.clone(),
            total_records,
            total_filtered,
            rows: page.rows,
        })
    }
}
