//! Paging and row projection against SQLite.

mod support;

use gridview::prelude::*;
use support::{column, executor, users_view, ACTIVE_USERS};

#[test]
fn test_first_page_sorted_by_name() {
    let executor = executor();
    let request = GridRequest::from_params([
        ("iDisplayStart", "0"),
        ("iDisplayLength", "5"),
        ("iSortCol_0", "1"),
        ("sSortDir_0", "asc"),
    ])
    .unwrap();

    let response = users_view().respond(&executor, &request).unwrap();

    assert_eq!(response.total_records, ACTIVE_USERS);
    assert_eq!(response.total_filtered, ACTIVE_USERS);
    assert_eq!(
        column(&response.rows, 1),
        vec!["Alice", "Bob", "Carol", "Dave", "Eve"]
    );
}

#[test]
fn test_rows_follow_projection_order() {
    let executor = executor();
    let request = GridRequest::new().page(0, 1).sort_by(0, SortDirection::Asc);

    let page = users_view().fetch_page(&executor, &request).unwrap();

    assert_eq!(
        page.rows,
        vec![vec![
            Value::Int(1),
            Value::from("Alice"),
            Value::from("alice@example.com"),
            // Trailing identifier entry.
            Value::Int(1),
        ]]
    );
    // The record carries every root column, not just the projected ones.
    let record = &page.records[0];
    assert_eq!(record.get("team_id"), Some(&Value::Int(1)));
    assert_eq!(record.get("active"), Some(&Value::Int(1)));
}

#[test]
fn test_sequential_pages_partition_rows() {
    let executor = executor();
    let view = users_view();

    let mut seen = Vec::new();
    for offset in (0..ACTIVE_USERS + 5).step_by(5) {
        let request = GridRequest::new()
            .page(offset, 5)
            .sort_by(0, SortDirection::Asc);
        let page = view.fetch_page(&executor, &request).unwrap();
        assert!(page.rows.len() <= 5);
        seen.extend(page.rows.iter().filter_map(|row| row[0].as_i64()));
    }

    assert_eq!(seen, (1..=12).collect::<Vec<i64>>());
}

#[test]
fn test_total_is_invariant_to_paging() {
    let executor = executor();
    let view = users_view();

    let totals: Vec<u64> = [
        GridRequest::new(),
        GridRequest::new().page(5, 5),
        GridRequest::new().page(100, 3).sort_by(2, SortDirection::Desc),
    ]
    .iter()
    .map(|request| view.respond(&executor, request).unwrap().total_records)
    .collect();

    assert_eq!(totals, vec![ACTIVE_USERS; 3]);
}

#[test]
fn test_non_positive_length_returns_everything() {
    let executor = executor();
    for length in ["0", "-1"] {
        let request = GridRequest::from_params([("iDisplayLength", length)]).unwrap();
        let page = users_view().fetch_page(&executor, &request).unwrap();
        assert_eq!(page.rows.len() as u64, ACTIVE_USERS);
    }
}

#[test]
fn test_offset_without_limit_is_ignored() {
    let executor = executor();
    let request = GridRequest::from_params([("iDisplayStart", "10"), ("iDisplayLength", "0")])
        .unwrap();
    let page = users_view().fetch_page(&executor, &request).unwrap();
    assert_eq!(page.rows.len() as u64, ACTIVE_USERS);
}

#[test]
fn test_offset_past_the_end() {
    let executor = executor();
    let request = GridRequest::new().page(50, 5);

    let response = users_view().respond(&executor, &request).unwrap();

    assert!(response.rows.is_empty());
    assert_eq!(response.total_records, ACTIVE_USERS);
}

#[test]
fn test_echo_is_returned() {
    let executor = executor();
    let request = GridRequest::from_params([("sEcho", "4"), ("iDisplayLength", "1")]).unwrap();

    let response = users_view().respond(&executor, &request).unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["sEcho"], "4");
    assert_eq!(json["iTotalRecords"], 12);
    assert_eq!(json["aaData"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_renderer_sees_full_record() {
    let executor = executor();
    let view = users_view().with_renderer(|record, row| {
        if let Some(team) = record.get("team_id") {
            row.push(Value::Text(format!("team-{}", team)));
        }
        row[2] = Value::from("hidden");
    });
    let request = GridRequest::new().page(0, 2).sort_by(0, SortDirection::Asc);

    let page = view.fetch_page(&executor, &request).unwrap();

    assert_eq!(column(&page.rows, 2), vec!["hidden", "hidden"]);
    // Id, Name, Email and the identifier come first; the renderer appends.
    assert!(page.rows.iter().all(|row| row.len() == 5));
    assert_eq!(column(&page.rows, 4), vec!["team-1", "team-2"]);
    // Records are left untouched.
    assert_eq!(
        page.records[0].get("email"),
        Some(&Value::from("alice@example.com"))
    );
}

#[test]
fn test_projection_mismatch_fails_loudly() {
    let executor = executor();
    let descriptor = QueryDescriptor::builder()
        .root("users", "u")
        .projection(vec![
            Field::parse("Name", "u.name").unwrap(),
            Field::parse("Nickname", "u.nickname").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .build()
        .unwrap();

    let err = GridView::new(descriptor)
        .fetch_page(&executor, &GridRequest::new().page(0, 1))
        .unwrap_err();

    match err {
        GridError::ProjectionMismatch { field, key } => {
            assert_eq!(field, "Nickname");
            assert_eq!(key, "nickname");
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn with_team(team: &str) -> GridResult<QueryDescriptor> {
    QueryDescriptor::builder()
        .root("users", "u")
        .projection(vec![
            Field::parse("Name", "u.name")?,
            Field::parse("Team", team)?,
        ])
        .join(JoinSpec::new(
            Relation::new("teams", "id", table_col("u", "team_id")),
            "t",
            JoinKind::Inner,
        ))
        .identifier(table_col("u", "id"))
        .build()
}

#[test]
fn test_same_named_joined_column_is_rejected() {
    let err = with_team("t.name").unwrap_err();

    assert!(matches!(err, GridError::Configuration(_)), "{err}");
    assert!(err.to_string().contains("'name'"));
}

#[test]
fn test_aliased_joined_column_reads_its_own_value() {
    let executor = executor();
    let request = GridRequest::new().page(0, 2).sort_by(0, SortDirection::Asc);

    let page = GridView::new(with_team("t.name as team").unwrap())
        .fetch_page(&executor, &request)
        .unwrap();

    assert_eq!(
        page.rows,
        vec![
            vec![Value::from("Alice"), Value::from("Red"), Value::Int(1)],
            vec![Value::from("Bob"), Value::from("Green"), Value::Int(2)],
        ]
    );
}

#[test]
fn test_engine_failure_propagates() {
    let executor = executor();
    let descriptor = QueryDescriptor::builder()
        .root("users", "u")
        .projection(vec![Field::parse("Team", "t.name as team").unwrap()])
        .identifier(table_col("u", "id"))
        .build()
        .unwrap();

    let err = GridView::new(descriptor)
        .fetch_page(&executor, &GridRequest::new())
        .unwrap_err();

    assert!(matches!(err, GridError::Execution(_)), "{err}");
    assert!(!err.is_client_error());
}
