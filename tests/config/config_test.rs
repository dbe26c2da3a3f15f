//! Views loaded from TOML files and run against a SQLite file.

use std::fs;
use std::path::{Path, PathBuf};

use gridview::config::{Settings, SettingsError};
use gridview::prelude::*;

const SEED: &str = r#"
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL, active INTEGER NOT NULL);
CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, status TEXT NOT NULL);
INSERT INTO users VALUES
    (1, 'Alice', 'alice@example.com', 1),
    (2, 'Bob', 'bob@example.com', 1),
    (3, 'Carol', 'carol@example.com', 0);
INSERT INTO orders (user_id, status) VALUES
    (1, 'paid'), (1, 'paid'), (1, 'open'), (2, 'open');
"#;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gridview-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_config(dir: &Path) -> PathBuf {
    let db = dir.join("app.db");
    let _ = fs::remove_file(&db);
    SqliteExecutor::open(&db)
        .unwrap()
        .connection()
        .execute_batch(SEED)
        .unwrap();

    std::env::set_var("GRIDVIEW_TEST_DATA", dir);
    let config = dir.join("gridview.toml");
    fs::write(
        &config,
        r#"
[database]
path = "${GRIDVIEW_TEST_DATA}/app.db"

[views.buyers]
entity = "users"
alias = "u"
fields = [
    ["Name", "u.name"],
    ["Email", "u.email"],
    ["Paid orders", "COUNT(o.id) as paid_orders"],
    ["_identifier_", "u.id"],
]
group_by = ["u.id"]
where = "u.active = :active"
params = { active = 1 }
order = { field = "u.name", direction = "desc" }
search = { enabled = true, all = true, columns = [0, 1] }

[[views.buyers.joins]]
table = "orders"
alias = "o"
kind = "left"
foreign_key = "user_id"
references = "u.id"
condition = "o.status = 'paid'"
"#,
    )
    .unwrap();
    config
}

#[test]
fn test_view_from_file() {
    let dir = scratch_dir("view");
    let settings = Settings::from_file(write_config(&dir)).unwrap();

    let executor = SqliteExecutor::open(settings.database.resolved_path().unwrap()).unwrap();
    let view = GridView::new(settings.descriptor("buyers").unwrap());

    let request = GridRequest::from_params([("iSortCol_0", "2"), ("sSortDir_0", "desc")]).unwrap();
    let response = view.respond(&executor, &request).unwrap();

    assert_eq!(response.total_records, 2);
    assert_eq!(response.total_filtered, 2);
    assert_eq!(
        response.rows,
        vec![
            vec![
                Value::from("Alice"),
                Value::from("alice@example.com"),
                Value::Int(2),
                Value::Int(1),
            ],
            vec![
                Value::from("Bob"),
                Value::from("bob@example.com"),
                Value::Int(0),
                Value::Int(2),
            ],
        ]
    );

    let request = GridRequest::from_params([("sSearch", "bob")]).unwrap();
    let response = view.respond(&executor, &request).unwrap();
    assert_eq!(response.total_records, 2);
    assert_eq!(response.total_filtered, 1);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_missing_file() {
    let err = Settings::from_file("/nonexistent/gridview.toml").unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}

#[test]
fn test_unbound_parameter_is_reported() {
    let settings: Settings = toml::from_str(
        r#"
[views.orphan]
entity = "users"
alias = "u"
fields = [["Name", "u.name"], ["_identifier_", "u.id"]]
where = "u.team = :team"
"#,
    )
    .unwrap();

    let descriptor = settings.descriptor("orphan").unwrap();
    let executor = SqliteExecutor::open_in_memory().unwrap();
    let err = GridView::new(descriptor)
        .count_total(&executor)
        .unwrap_err();
    assert!(err.to_string().contains(":team"), "{err}");
}
