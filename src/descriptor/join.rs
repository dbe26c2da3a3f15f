//! Join specifications and join-relative search paths.

use serde::{Deserialize, Serialize};

use crate::sql::{table_col, Expr, ExprExt, JoinType, Query, TableRef};

/// Kind of a configured join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
        }
    }
}

/// How a related table is reached from the query:
/// `JOIN table AS <alias> ON <alias>.foreign_key = references`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub table: String,
    pub foreign_key: String,
    pub references: Expr,
}

impl Relation {
    pub fn new(table: &str, foreign_key: &str, references: Expr) -> Self {
        Self {
            table: table.into(),
            foreign_key: foreign_key.into(),
            references,
        }
    }

    pub(crate) fn on(&self, alias: &str) -> Expr {
        table_col(alias, &self.foreign_key).eq(self.references.clone())
    }

    pub(crate) fn table_ref(&self, alias: &str) -> TableRef {
        TableRef::new(&self.table).with_alias(alias)
    }
}

/// A join fixed at configuration time.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub relation: Relation,
    pub alias: String,
    pub kind: JoinKind,
    /// Extra ON-clause condition, ANDed after the key match.
    pub condition: Option<Expr>,
}

impl JoinSpec {
    pub fn new(relation: Relation, alias: &str, kind: JoinKind) -> Self {
        Self {
            relation,
            alias: alias.into(),
            kind,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.condition = Some(condition);
        self
    }

    pub(crate) fn apply(&self, query: Query) -> Query {
        let mut on = self.relation.on(&self.alias);
        if let Some(condition) = &self.condition {
            on = on.and(condition.clone().paren());
        }
        query.join(
            self.kind.into(),
            self.relation.table_ref(&self.alias),
            on,
        )
    }
}

/// Join-relative path searched instead of a projected field that cannot be
/// filtered directly (an aggregate over a to-many relation, say).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    pub relation: Relation,
    pub column: String,
}

impl SearchPath {
    pub fn new(relation: Relation, column: &str) -> Self {
        Self {
            relation,
            column: column.into(),
        }
    }

    /// Left-join the relation under `alias` and return the searched column.
    pub(crate) fn join(&self, query: Query, alias: &str) -> (Query, Expr) {
        let query = query.left_join(self.relation.table_ref(alias), self.relation.on(alias));
        (query, table_col(alias, &self.column))
    }
}
