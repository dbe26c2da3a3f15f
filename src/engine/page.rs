//! Data query shape and row projection.

use crate::descriptor::{Field, QueryDescriptor};
use crate::error::{GridError, GridResult};
use crate::request::GridRequest;
use crate::sql::{table_star, OrderByExpr, SelectExpr};
use crate::value::{Record, Value};

/// ORDER BY for the request: the resolved field's expression (never its
/// alias), or nothing when the request names no sort column.
pub(crate) fn resolve_order(
    descriptor: &QueryDescriptor,
    request: &GridRequest,
) -> GridResult<Vec<OrderByExpr>> {
    let Some(sort) = request.sort else {
        return Ok(Vec::new());
    };

    let index = descriptor.selector_column().projection_index(sort.column);
    let field = descriptor.fields().get(index).ok_or_else(|| {
        GridError::invalid_param(
            "iSortCol_0",
            sort.column.to_string(),
            format!("the view has {} columns", descriptor.fields().len()),
        )
    })?;

    Ok(vec![OrderByExpr {
        expr: field.expr.clone(),
        dir: Some(sort.direction.into()),
    }])
}

/// `root.*` plus every entry the root wildcard does not already cover,
/// each labelled by its record key.
pub(crate) fn data_select(descriptor: &QueryDescriptor) -> Vec<SelectExpr> {
    let root = descriptor.root_alias();
    std::iter::once(SelectExpr::new(table_star(root)))
        .chain(
            descriptor
                .fields()
                .iter()
                .filter(|f| !f.is_root_column(root))
                .map(Field::select_expr),
        )
        .collect()
}

/// Flatten a record into projection order.
pub(crate) fn flatten(fields: &[Field], record: &Record) -> GridResult<Vec<Value>> {
    fields
        .iter()
        .map(|field| {
            record
                .get(field.key())
                .cloned()
                .ok_or_else(|| GridError::ProjectionMismatch {
                    field: field.label.clone(),
                    key: field.key().to_string(),
                })
        })
        .collect()
}
