//! Field projection entries and field-path parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{GridError, GridResult};
use crate::sql::{raw_sql, table_col, Expr, ExprExt, SelectExpr};

/// Reserved label of the field used as the row identifier when counting.
pub const IDENTIFIER_LABEL: &str = "_identifier_";

static FIELD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)\.([A-Za-z_]\w*)$").unwrap());

static AS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*\S)\s+as\s+([A-Za-z_]\w*)$").unwrap());

/// Expression for `alias.column`, or a raw fragment for anything else.
pub fn parse_expr(text: &str) -> Expr {
    let text = text.trim();
    match FIELD_PATH.captures(text) {
        Some(caps) => table_col(&caps[1], &caps[2]),
        None => raw_sql(text),
    }
}

/// One entry of the ordered field projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Display label, as the client knows the column.
    pub label: String,
    /// Expression the column reads.
    pub expr: Expr,
    /// Explicit projection alias (`expr AS alias`).
    pub alias: Option<String>,
}

impl Field {
    pub fn new(label: &str, expr: Expr) -> Self {
        Self {
            label: label.into(),
            expr,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Parse `alias.column [as name]`.
    ///
    /// Anything other than a two-segment dotted path is kept as a raw
    /// expression and must carry an `as name` alias, since there is no
    /// column name to read it back by.
    pub fn parse(label: &str, text: &str) -> GridResult<Self> {
        let text = text.trim();
        let (path, alias) = match AS_SUFFIX.captures(text) {
            Some(caps) => (
                caps.get(1).map_or(text, |m| m.as_str()),
                caps.get(2).map(|m| m.as_str().to_string()),
            ),
            None => (text, None),
        };

        if path.is_empty() {
            return Err(GridError::config(format!("field '{}' has an empty path", label)));
        }

        let expr = parse_expr(path);
        if !matches!(expr, Expr::Column { .. }) && alias.is_none() {
            return Err(GridError::config(format!(
                "field '{}' uses expression '{}' without an 'as' alias",
                label, path
            )));
        }

        Ok(Self {
            label: label.into(),
            expr,
            alias,
        })
    }

    /// Key the value is read back by from a fetched record.
    ///
    /// The explicit alias if set, otherwise the rightmost segment of the
    /// column path.
    pub fn key(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        match &self.expr {
            Expr::Column { column, .. } => column,
            _ => &self.label,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.label == IDENTIFIER_LABEL
    }

    /// Whether `alias.*` on the root table already yields this column under
    /// its key.
    pub fn is_root_column(&self, root_alias: &str) -> bool {
        self.alias.is_none()
            && matches!(&self.expr, Expr::Column { table: Some(t), .. } if t == root_alias)
    }

    /// Expression usable in WHERE clauses.
    pub(crate) fn filter_expr(&self) -> Expr {
        match &self.expr {
            Expr::Raw(_) => self.expr.clone().paren(),
            other => other.clone(),
        }
    }

    /// SELECT item labelled by [`Field::key`].
    pub(crate) fn select_expr(&self) -> SelectExpr {
        SelectExpr::new(self.expr.clone()).with_alias(self.key())
    }
}
