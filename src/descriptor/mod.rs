//! Static shape of a grid view.
//!
//! A [`QueryDescriptorBuilder`] collects the root entity, the ordered field
//! projection, fixed joins, default order, static predicate, grouping and
//! search configuration, and validates them into an immutable
//! [`QueryDescriptor`]. Requests never mutate the descriptor; every
//! execution starts from a fresh [`QueryDescriptor::base_query`].

mod field;
mod join;

pub use field::{parse_expr, Field, IDENTIFIER_LABEL};
pub use join::{JoinKind, JoinSpec, Relation, SearchPath};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::sql::{Expr, ExprExt, OrderByExpr, Query, SortDir, TableRef};
use crate::value::{Params, Value};

/// Prefix reserved for parameters the engine binds for search terms.
pub(crate) const SEARCH_PARAM_PREFIX: &str = "__search";

// =============================================================================
// Ordering
// =============================================================================

/// Sort direction of a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl From<SortDirection> for SortDir {
    fn from(dir: SortDirection) -> Self {
        match dir {
            SortDirection::Asc => SortDir::Asc,
            SortDirection::Desc => SortDir::Desc,
        }
    }
}

/// Configured default order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    pub expr: Expr,
    pub direction: SortDirection,
}

impl OrderSpec {
    pub(crate) fn to_order_by(&self) -> OrderByExpr {
        OrderByExpr {
            expr: self.expr.clone(),
            dir: Some(self.direction.into()),
        }
    }
}

/// Whether the client grid shows a non-data column before the projection.
///
/// With `Leading`, client column `n` is projection entry `n - 1` (clamped
/// at zero) when resolving sort requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorColumn {
    #[default]
    None,
    Leading,
}

impl SelectorColumn {
    /// Projection index for a client column index.
    pub fn projection_index(self, client_column: usize) -> usize {
        match self {
            SelectorColumn::None => client_column,
            SelectorColumn::Leading => client_column.saturating_sub(1),
        }
    }
}

// =============================================================================
// Search
// =============================================================================

/// How search terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// One global term, ORed across every searchable column.
    #[default]
    All,
    /// One term per column, ANDed.
    PerColumn,
}

/// Search configuration of a view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSpec {
    pub enabled: bool,
    pub mode: SearchMode,
    pub columns: BTreeSet<usize>,
    pub paths: BTreeMap<usize, SearchPath>,
}

impl SearchSpec {
    pub fn is_searchable(&self, index: usize) -> bool {
        self.columns.contains(&index)
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// Immutable description of one grid view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    root: TableRef,
    root_alias: String,
    fields: Vec<Field>,
    identifier: usize,
    joins: Vec<JoinSpec>,
    order: Option<OrderSpec>,
    predicate: Option<Expr>,
    params: Params,
    group_by: Vec<Expr>,
    search: SearchSpec,
    selector_column: SelectorColumn,
}

impl QueryDescriptor {
    pub fn builder() -> QueryDescriptorBuilder {
        QueryDescriptorBuilder::default()
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Ordered field projection; index `i` is client column `i`.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field designated as the row identifier.
    pub fn identifier(&self) -> &Field {
        &self.fields[self.identifier]
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn default_order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    /// Values bound to the static predicate.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn group_by(&self) -> &[Expr] {
        &self.group_by
    }

    pub fn search(&self) -> &SearchSpec {
        &self.search
    }

    pub fn selector_column(&self) -> SelectorColumn {
        self.selector_column
    }

    /// Every alias the configured query already uses.
    pub fn aliases(&self) -> HashSet<String> {
        std::iter::once(self.root_alias.clone())
            .chain(self.joins.iter().map(|j| j.alias.clone()))
            .collect()
    }

    /// The configured query: projection, root, joins, static predicate,
    /// grouping and default order.
    pub fn base_query(&self) -> Query {
        let mut query = Query::new()
            .select(self.fields.iter().map(Field::select_expr).collect::<Vec<_>>())
            .from(self.root.clone());

        for join in &self.joins {
            query = join.apply(query);
        }
        if let Some(predicate) = &self.predicate {
            query = query.filter(predicate.clone().paren());
        }
        query
            .group_by(self.group_by.clone())
            .order_by(self.order.iter().map(OrderSpec::to_order_by).collect())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Fluent configuration of a [`QueryDescriptor`].
///
/// Setters never fail; [`QueryDescriptorBuilder::build`] validates the
/// whole shape at once.
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until built"]
pub struct QueryDescriptorBuilder {
    root: Option<(String, String)>,
    fields: Vec<Field>,
    joins: Vec<JoinSpec>,
    order: Option<OrderSpec>,
    predicate: Option<Expr>,
    params: Params,
    group_by: Vec<Expr>,
    search: SearchSpec,
    selector_column: SelectorColumn,
}

impl QueryDescriptorBuilder {
    /// Root entity (`table` or `schema.table`) and its alias.
    pub fn root(mut self, entity: &str, alias: &str) -> Self {
        self.root = Some((entity.into(), alias.into()));
        self
    }

    /// Replace the whole projection.
    pub fn projection(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Append one projection entry.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append the identifier entry, replacing any earlier one.
    pub fn identifier(mut self, expr: Expr) -> Self {
        self.fields.retain(|f| !f.is_identifier());
        self.fields.push(Field::new(IDENTIFIER_LABEL, expr));
        self
    }

    /// Add a fixed join.
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    /// Default order, used until a request asks for none.
    pub fn order(mut self, expr: Expr, direction: SortDirection) -> Self {
        self.order = Some(OrderSpec { expr, direction });
        self
    }

    /// Static predicate and the values it binds, replaced together.
    pub fn filter(mut self, predicate: Expr, params: Params) -> Self {
        self.predicate = Some(predicate);
        self.params = params;
        self
    }

    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    pub fn search(mut self, enabled: bool) -> Self {
        self.search.enabled = enabled;
        self
    }

    /// `true` for one global term ORed over all columns, `false` for
    /// per-column terms.
    pub fn search_all(mut self, all: bool) -> Self {
        self.search.mode = if all {
            SearchMode::All
        } else {
            SearchMode::PerColumn
        };
        self
    }

    pub fn searchable_columns(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.search.columns = indices.into_iter().collect();
        self
    }

    pub fn search_paths(mut self, paths: BTreeMap<usize, SearchPath>) -> Self {
        self.search.paths = paths;
        self
    }

    pub fn search_path(mut self, index: usize, path: SearchPath) -> Self {
        self.search.paths.insert(index, path);
        self
    }

    pub fn selector_column(mut self, selector: SelectorColumn) -> Self {
        self.selector_column = selector;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> GridResult<QueryDescriptor> {
        let (entity, alias) = self
            .root
            .ok_or_else(|| GridError::config("no root entity configured"))?;
        if entity.trim().is_empty() || alias.trim().is_empty() {
            return Err(GridError::config("root entity and alias must be non-empty"));
        }
        if self.fields.is_empty() {
            return Err(GridError::config("field projection is empty"));
        }

        let identifier = self
            .fields
            .iter()
            .position(Field::is_identifier)
            .ok_or_else(|| {
                GridError::config(format!("no '{}' field in the projection", IDENTIFIER_LABEL))
            })?;

        // Rows are read back by key, so one key must mean one expression.
        let mut keys: HashMap<&str, &Field> = HashMap::new();
        for field in &self.fields {
            match keys.get(field.key()) {
                Some(first) if first.expr != field.expr => {
                    return Err(GridError::config(format!(
                        "fields '{}' and '{}' both read '{}'; give one an 'as' alias",
                        first.label,
                        field.label,
                        field.key()
                    )));
                }
                Some(_) => {}
                None => {
                    keys.insert(field.key(), field);
                }
            }
        }

        let mut aliases = HashSet::from([alias.clone()]);
        for join in &self.joins {
            if join.alias.trim().is_empty() {
                return Err(GridError::config(format!(
                    "join to '{}' has an empty alias",
                    join.relation.table
                )));
            }
            if !aliases.insert(join.alias.clone()) {
                return Err(GridError::config(format!(
                    "alias '{}' is used more than once",
                    join.alias
                )));
            }
        }

        let width = self.fields.len();
        if let Some(index) = self
            .search
            .columns
            .iter()
            .chain(self.search.paths.keys())
            .find(|&&i| i >= width)
        {
            return Err(GridError::config(format!(
                "search column {} is outside the {}-field projection",
                index, width
            )));
        }

        if let Some(name) = self
            .params
            .keys()
            .find(|name| name.starts_with(SEARCH_PARAM_PREFIX))
        {
            return Err(GridError::config(format!(
                "parameter name '{}' is reserved for search terms",
                name
            )));
        }

        Ok(QueryDescriptor {
            root: TableRef::new(&entity).with_alias(&alias),
            root_alias: alias,
            fields: self.fields,
            identifier,
            joins: self.joins,
            order: self.order,
            predicate: self.predicate,
            params: self.params,
            group_by: self.group_by,
            search: self.search,
            selector_column: self.selector_column,
        })
    }
}

/// Bind a single named value; shorthand for one-parameter predicates.
pub fn bind(name: &str, value: impl Into<Value>) -> Params {
    Params::from([(name.to_string(), value.into())])
}
