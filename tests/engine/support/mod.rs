//! Shared SQLite fixtures for engine integration tests.
#![allow(dead_code)]

use gridview::prelude::*;

const SCHEMA: &str = r#"
CREATE TABLE teams (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    team_id INTEGER REFERENCES teams(id),
    active INTEGER NOT NULL
);

CREATE TABLE user_roles (
    user_id INTEGER NOT NULL REFERENCES users(id),
    role TEXT NOT NULL
);

INSERT INTO teams (id, name) VALUES (1, 'Red'), (2, 'Green'), (3, 'Blue');

INSERT INTO users (id, name, email, team_id, active) VALUES
    (1, 'Alice', 'alice@example.com', 1, 1),
    (2, 'Bob', 'bob@example.com', 2, 1),
    (3, 'Carol', 'carol@example.com', 1, 1),
    (4, 'Dave', 'dave@example.com', 3, 1),
    (5, 'Eve', 'hannah.eve@example.com', 2, 1),
    (6, 'Frank', 'frank@example.com', 3, 1),
    (7, 'Grace', 'grace@example.com', 1, 1),
    (8, 'Heidi', 'heidi@example.com', 2, 1),
    (9, 'Ivan', 'ivan@annex.io', 3, 1),
    (10, 'Judy', 'judy@example.com', 1, 1),
    (11, 'Mallory', 'mallory@example.com', 2, 1),
    (12, 'Oscar', 'oscar@example.com', 3, 1),
    (13, 'Zed', 'zannie@example.com', 1, 0);

INSERT INTO user_roles (user_id, role)
SELECT id, 'member' FROM users;

INSERT INTO user_roles (user_id, role) VALUES
    (1, 'admin'), (4, 'admin'), (7, 'admin'), (10, 'admin'),
    (2, 'auditor'), (4, 'auditor'),
    (13, 'admin');
"#;

/// Active users in the fixture.
pub const ACTIVE_USERS: u64 = 12;

/// In-memory database seeded with teams, users and roles.
pub fn executor() -> SqliteExecutor {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.connection().execute_batch(SCHEMA).unwrap();
    executor
}

fn active_users() -> gridview::QueryDescriptorBuilder {
    QueryDescriptor::builder()
        .root("users", "u")
        .filter(raw_sql("u.active = :active"), bind("active", 1))
}

/// `[Id, Name, Email]` over active users, no search.
pub fn users_view() -> GridView {
    let descriptor = active_users()
        .projection(vec![
            Field::parse("Id", "u.id").unwrap(),
            Field::parse("Name", "u.name").unwrap(),
            Field::parse("Email", "u.email").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .build()
        .unwrap();
    GridView::new(descriptor)
}

/// `[Id, Name, Email, Team]` with search over name, email and the team name.
///
/// The Team column shows `u.team_id`; searching it goes through `teams`.
pub fn searchable_users_view(all: bool) -> GridView {
    let descriptor = active_users()
        .projection(vec![
            Field::parse("Id", "u.id").unwrap(),
            Field::parse("Name", "u.name").unwrap(),
            Field::parse("Email", "u.email").unwrap(),
            Field::parse("Team", "u.team_id").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .search(true)
        .search_all(all)
        .searchable_columns([1, 2, 3])
        .search_path(
            3,
            SearchPath::new(
                Relation::new("teams", "id", table_col("u", "team_id")),
                "name",
            ),
        )
        .build()
        .unwrap();
    GridView::new(descriptor)
}

/// Users grouped by id with a role count, searchable by role.
pub fn grouped_roles_view() -> GridView {
    let descriptor = active_users()
        .projection(vec![
            Field::parse("Id", "u.id").unwrap(),
            Field::parse("Name", "u.name").unwrap(),
            Field::parse("Roles", "COUNT(r.role) as role_count").unwrap(),
        ])
        .identifier(table_col("u", "id"))
        .join(JoinSpec::new(
            Relation::new("user_roles", "user_id", table_col("u", "id")),
            "r",
            JoinKind::Left,
        ))
        .group_by(vec![table_col("u", "id")])
        .search(true)
        .search_all(false)
        .searchable_columns([1, 2])
        .search_path(
            2,
            SearchPath::new(
                Relation::new("user_roles", "user_id", table_col("u", "id")),
                "role",
            ),
        )
        .build()
        .unwrap();
    GridView::new(descriptor)
}

/// Text values of one column across rows.
pub fn column(rows: &[Vec<Value>], index: usize) -> Vec<String> {
    rows.iter()
        .map(|row| row[index].as_str().unwrap_or_default().to_string())
        .collect()
}
