//! Search predicates against SQLite.

mod support;

use gridview::prelude::*;
use support::{column, executor, searchable_users_view, ACTIVE_USERS};

fn respond(view: &GridView, params: &[(&str, &str)]) -> GridResponse {
    let request = GridRequest::from_params(params.iter().copied()).unwrap();
    view.respond(&executor(), &request).unwrap()
}

#[test]
fn test_search_all_matches_any_column() {
    let view = searchable_users_view(true);
    let response = respond(&view, &[("sSearch", "ann"), ("iSortCol_0", "0")]);

    assert_eq!(response.total_records, ACTIVE_USERS);
    assert_eq!(response.total_filtered, 2);
    // Both rows match by email only; the inactive 'zannie' stays filtered out.
    assert_eq!(column(&response.rows, 1), vec!["Eve", "Ivan"]);
    assert!(column(&response.rows, 1).iter().all(|n| !n.contains("ann")));
}

#[test]
fn test_search_all_predicate_shape() {
    let view = searchable_users_view(true);
    let request = GridRequest::new().search("ann");

    let compiled = view
        .count_query(&request, true)
        .compile(Dialect::Postgres)
        .unwrap();

    insta::assert_snapshot!(compiled.sql, @r###"
    SELECT
      COUNT("u"."id")
    FROM "users" AS "u"
    LEFT JOIN "teams" AS "_s0" ON "_s0"."id" = "u"."team_id"
    WHERE (u.active = $1) AND ("u"."name" LIKE $2 ESCAPE '!' OR "u"."email" LIKE $3 ESCAPE '!' OR "_s0"."name" LIKE $4 ESCAPE '!')
    "###);
    // The shared term is bound once per placeholder.
    assert_eq!(compiled.params.len(), 4);
    assert_eq!(compiled.params[0], Value::Int(1));
    assert!(compiled.params[1..].iter().all(|p| *p == Value::from("%ann%")));
}

#[test]
fn test_search_is_case_sensitive() {
    let view = searchable_users_view(true);
    assert_eq!(respond(&view, &[("sSearch", "ANN")]).total_filtered, 0);
    assert_eq!(respond(&view, &[("sSearch", "Ali")]).total_filtered, 1);
}

#[test]
fn test_wildcards_match_literally() {
    let view = searchable_users_view(true);
    for term in ["%", "_", "!", "[a]"] {
        let response = respond(&view, &[("sSearch", term)]);
        assert_eq!(response.total_filtered, 0, "term {term:?}");
        assert!(response.rows.is_empty());
    }
}

#[test]
fn test_quotes_are_bound_not_spliced() {
    let view = searchable_users_view(true);
    let response = respond(&view, &[("sSearch", "o'brien\"; DROP TABLE users; --")]);
    assert_eq!(response.total_filtered, 0);
    assert_eq!(respond(&view, &[]).total_records, ACTIVE_USERS);
}

#[test]
fn test_search_path_joins_related_table() {
    let view = searchable_users_view(true);
    let response = respond(&view, &[("sSearch", "Blue"), ("iSortCol_0", "0")]);

    assert_eq!(response.total_filtered, 4);
    assert_eq!(column(&response.rows, 1), vec!["Dave", "Frank", "Ivan", "Oscar"]);
    // The displayed Team column stays the raw foreign key.
    assert!(response.rows.iter().all(|row| row[3] == Value::Int(3)));
}

#[test]
fn test_per_column_terms_are_anded() {
    let view = searchable_users_view(false);
    let response = respond(
        &view,
        &[
            ("sSearch_1", "a"),
            ("sSearch_2", "example"),
            ("iSortCol_0", "1"),
        ],
    );

    assert_eq!(
        column(&response.rows, 1),
        vec!["Carol", "Dave", "Frank", "Grace", "Mallory", "Oscar"]
    );
    assert_eq!(response.total_filtered, 6);
}

#[test]
fn test_per_column_search_path() {
    let view = searchable_users_view(false);
    let response = respond(&view, &[("sSearch_3", "Re"), ("sSearch_1", "e")]);

    // Red team members with a lowercase 'e' in their name.
    let mut names = column(&response.rows, 1);
    names.sort();
    assert_eq!(names, vec!["Alice", "Grace"]);
}

#[test]
fn test_mode_ignores_other_parameters() {
    // Per-column mode ignores the global term.
    let per_column = searchable_users_view(false);
    assert_eq!(
        respond(&per_column, &[("sSearch", "ann")]).total_filtered,
        ACTIVE_USERS
    );

    // Search-all mode ignores per-column terms.
    let all = searchable_users_view(true);
    assert_eq!(
        respond(&all, &[("sSearch_1", "Alice")]).total_filtered,
        ACTIVE_USERS
    );
}

#[test]
fn test_non_searchable_column_is_ignored() {
    let view = searchable_users_view(false);
    let without = respond(&view, &[("iDisplayLength", "5")]);
    let with = respond(&view, &[("iDisplayLength", "5"), ("sSearch_0", "7")]);

    assert_eq!(with.total_records, without.total_records);
    assert_eq!(with.total_filtered, without.total_filtered);
    assert_eq!(with.rows, without.rows);
}

#[test]
fn test_disabled_search_ignores_terms() {
    let view = support::users_view();
    let response = respond(&view, &[("sSearch", "zzz"), ("sSearch_1", "zzz")]);
    assert_eq!(response.total_filtered, ACTIVE_USERS);
    assert_eq!(response.rows.len() as u64, ACTIVE_USERS);
}

#[test]
fn test_sequential_aliases_avoid_configured_ones() {
    let descriptor = QueryDescriptor::builder()
        .root("users", "_s0")
        .projection(vec![
            Field::parse("Name", "_s0.name").unwrap(),
            Field::parse("Team", "_s0.team_id").unwrap(),
        ])
        .identifier(table_col("_s0", "id"))
        .search(true)
        .searchable_columns([1])
        .search_path(
            1,
            SearchPath::new(
                Relation::new("teams", "id", table_col("_s0", "team_id")),
                "name",
            ),
        )
        .build()
        .unwrap();
    let view = GridView::new(descriptor);
    let request = GridRequest::new().search("Green");

    let sql = view.data_query(&request).unwrap().query.to_sql(Dialect::Sqlite);
    assert!(sql.contains("LEFT JOIN \"teams\" AS \"_s1\""), "{sql}");

    let page = view.fetch_page(&executor(), &request).unwrap();
    assert_eq!(page.rows.len(), 4);
}
