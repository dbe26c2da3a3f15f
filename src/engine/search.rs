//! Search predicate assembly.

use std::collections::HashSet;

use super::alias::{AliasGenerator, AliasScope};
use crate::descriptor::{QueryDescriptor, SearchMode, SEARCH_PARAM_PREFIX};
use crate::request::GridRequest;
use crate::sql::{contains_pattern, param, ExprExt, Query, LIKE_ESCAPE};
use crate::value::{Params, Value};

/// Layer the request's search terms onto `query`.
///
/// Returns the query and the parameters its search predicates bind. An
/// empty parameter set means no predicate (and no join) was added.
pub(crate) fn apply_search(
    descriptor: &QueryDescriptor,
    request: &GridRequest,
    aliases: &dyn AliasGenerator,
    mut query: Query,
) -> (Query, Params) {
    let spec = descriptor.search();
    let mut params = Params::new();
    if !spec.enabled {
        return (query, params);
    }

    let taken: HashSet<String> = query
        .table_aliases()
        .map(String::from)
        .chain(descriptor.aliases())
        .collect();
    let mut scope = AliasScope::new(aliases, taken);
    let mut predicates = Vec::new();

    for &index in &spec.columns {
        let Some(field) = descriptor.fields().get(index) else {
            continue;
        };
        let (term, name) = match spec.mode {
            SearchMode::All => (request.search.as_str(), SEARCH_PARAM_PREFIX.to_string()),
            SearchMode::PerColumn => (
                request.column_search.get(&index).map_or("", String::as_str),
                format!("{}_{}", SEARCH_PARAM_PREFIX, index),
            ),
        };
        if term.is_empty() {
            continue;
        }

        let target = match spec.paths.get(&index) {
            Some(path) => {
                let alias = scope.next_alias();
                let (joined, target) = path.join(query, &alias);
                query = joined;
                target
            }
            None => field.filter_expr(),
        };

        params
            .entry(name.clone())
            .or_insert_with(|| Value::Text(contains_pattern(term)));
        predicates.push(target.like_escape(param(&name), LIKE_ESCAPE));
    }

    let combined = predicates.into_iter().reduce(|acc, p| match spec.mode {
        SearchMode::All => acc.or(p),
        SearchMode::PerColumn => acc.and(p),
    });
    if let Some(predicate) = combined {
        query = query.filter(predicate.paren());
    }

    (query, params)
}
