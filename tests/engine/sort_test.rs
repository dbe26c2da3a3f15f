//! Request sorting against SQLite.

mod support;

use gridview::prelude::*;
use support::{column, executor, grouped_roles_view, users_view};

fn names(view: &GridView, request: &GridRequest) -> Vec<String> {
    let page = view.fetch_page(&executor(), request).unwrap();
    column(&page.rows, 1)
}

#[test]
fn test_sort_descending_by_email() {
    let request = GridRequest::new().page(0, 3).sort_by(2, SortDirection::Desc);
    assert_eq!(names(&users_view(), &request), vec!["Oscar", "Mallory", "Judy"]);
}

#[test]
fn test_omitted_sort_clears_default_order() {
    let descriptor = QueryDescriptor::builder()
        .root("users", "u")
        .projection(vec![
            Field::parse("Id", "u.id").unwrap(),
            Field::parse("Name", "u.name").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .order(table_col("u", "name"), SortDirection::Desc)
        .build()
        .unwrap();
    let view = GridView::new(descriptor);
    let request = GridRequest::from_params([("sSortDir_0", "desc"), ("iDisplayLength", "3")])
        .unwrap();

    let sql = view.data_query(&request).unwrap().query.to_sql(Dialect::Sqlite);
    assert!(!sql.contains("ORDER BY"), "{sql}");

    // Natural table order, not the configured descending name order.
    assert_eq!(names(&view, &request), vec!["Alice", "Bob", "Carol"]);
}

#[test]
fn test_sort_by_aliased_expression_uses_expression() {
    let view = grouped_roles_view();
    let request = GridRequest::new().page(0, 1).sort_by(2, SortDirection::Desc);

    let sql = view.data_query(&request).unwrap().query.to_sql(Dialect::Sqlite);
    assert!(sql.contains("ORDER BY COUNT(r.role) DESC"), "{sql}");

    let page = view.fetch_page(&executor(), &request).unwrap();
    assert_eq!(
        page.rows,
        vec![vec![Value::Int(4), Value::from("Dave"), Value::Int(3), Value::Int(4)]]
    );
}

#[test]
fn test_leading_selector_column_shifts_sort_index() {
    let descriptor = QueryDescriptor::builder()
        .root("users", "u")
        .projection(vec![
            Field::parse("Name", "u.name").unwrap(),
            Field::parse("Email", "u.email").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .selector_column(SelectorColumn::Leading)
        .build()
        .unwrap();
    let view = GridView::new(descriptor);
    let executor = executor();

    // Client column 2 is projection entry 1 (Email).
    let request = GridRequest::new().page(0, 2).sort_by(2, SortDirection::Desc);
    let page = view.fetch_page(&executor, &request).unwrap();
    assert_eq!(column(&page.rows, 0), vec!["Zed", "Oscar"]);

    // The selector column itself clamps to the first entry.
    let request = GridRequest::new().page(0, 2).sort_by(0, SortDirection::Asc);
    let page = view.fetch_page(&executor, &request).unwrap();
    assert_eq!(column(&page.rows, 0), vec!["Alice", "Bob"]);
}

#[test]
fn test_sort_column_out_of_range() {
    let request = GridRequest::from_params([("iSortCol_0", "9")]).unwrap();
    let err = users_view().fetch_page(&executor(), &request).unwrap_err();

    assert!(err.is_client_error());
    assert!(matches!(
        err,
        GridError::InvalidRequestParameter { ref name, .. } if name == "iSortCol_0"
    ));
}
