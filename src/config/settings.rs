//! TOML-based configuration for gridview.
//!
//! Supports a config file (gridview.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! path = "${APP_DATA}/app.db"
//! dialect = "sqlite"
//!
//! [views.users]
//! entity = "users"
//! alias = "u"
//! fields = [["Id", "u.id"], ["Name", "u.name"], ["Email", "u.email"], ["_identifier_", "u.id"]]
//! order = { field = "u.name", direction = "asc" }
//! where = "u.active = :active"
//! params = { active = 1 }
//! search = { enabled = true, all = true, columns = [1, 2] }
//!
//! [[views.users.joins]]
//! table = "orders"
//! alias = "o"
//! kind = "left"
//! foreign_key = "user_id"
//! references = "u.id"
//! condition = "o.status = 'paid'"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::descriptor::{
    parse_expr, Field, JoinKind, JoinSpec, QueryDescriptor, Relation, SearchPath, SelectorColumn,
    SortDirection,
};
use crate::error::{GridError, GridResult};
use crate::sql::Dialect;
use crate::value::Params;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("No database path configured")]
    NoDatabase,

    #[error("Invalid view '{name}': {source}")]
    InvalidView {
        name: String,
        #[source]
        source: GridError,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database the CLI runs views against.
    pub database: DatabaseSettings,

    /// Named grid views.
    pub views: BTreeMap<String, ViewSettings>,
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Dialect SQL is rendered in.
    pub dialect: Dialect,
}

impl DatabaseSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self.path.as_deref().ok_or(SettingsError::NoDatabase)?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }
}

/// One grid view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewSettings {
    /// Root table (`table` or `schema.table`).
    pub entity: String,

    /// Alias of the root table.
    pub alias: String,

    /// `[label, "alias.column [as name]"]` pairs in client column order.
    pub fields: Vec<(String, String)>,

    /// Identifier path, when the fields carry no `_identifier_` entry.
    #[serde(default)]
    pub identifier: Option<String>,

    /// Default order.
    #[serde(default)]
    pub order: Option<OrderSettings>,

    #[serde(default)]
    pub group_by: Vec<String>,

    /// Static predicate; `:name` references bind from `params`.
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,

    #[serde(default)]
    pub params: Params,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub selector_column: SelectorColumn,

    #[serde(default)]
    pub joins: Vec<JoinSettings>,
}

/// Default order of a view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderSettings {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Search configuration of a view.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    pub enabled: bool,

    /// One global term ORed across columns, instead of per-column terms.
    pub all: bool,

    /// Searchable client column indices.
    pub columns: Vec<usize>,

    /// Join-relative search paths keyed by column index.
    pub paths: BTreeMap<String, SearchPathSettings>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            all: true,
            columns: Vec::new(),
            paths: BTreeMap::new(),
        }
    }
}

/// A join-relative search path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPathSettings {
    pub table: String,
    pub foreign_key: String,
    pub references: String,
    pub column: String,
}

/// A fixed join.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JoinSettings {
    pub table: String,
    pub alias: String,
    #[serde(default)]
    pub kind: JoinKind,
    pub foreign_key: String,
    pub references: String,
    #[serde(default)]
    pub condition: Option<String>,
}

impl ViewSettings {
    /// Build the view's descriptor.
    pub fn to_descriptor(&self) -> GridResult<QueryDescriptor> {
        let fields = self
            .fields
            .iter()
            .map(|(label, path)| Field::parse(label, path))
            .collect::<GridResult<Vec<_>>>()?;

        let mut builder = QueryDescriptor::builder()
            .root(&self.entity, &self.alias)
            .projection(fields)
            .group_by(self.group_by.iter().map(|g| parse_expr(g)).collect())
            .search(self.search.enabled)
            .search_all(self.search.all)
            .searchable_columns(self.search.columns.iter().copied())
            .selector_column(self.selector_column);

        if let Some(identifier) = &self.identifier {
            builder = builder.identifier(parse_expr(identifier));
        }
        if let Some(order) = &self.order {
            builder = builder.order(parse_expr(&order.field), order.direction);
        }
        if let Some(predicate) = &self.where_clause {
            builder = builder.filter(parse_expr(predicate), self.params.clone());
        } else if !self.params.is_empty() {
            return Err(GridError::config("params are set but there is no where clause"));
        }

        for join in &self.joins {
            let mut spec = JoinSpec::new(
                Relation::new(&join.table, &join.foreign_key, parse_expr(&join.references)),
                &join.alias,
                join.kind,
            );
            if let Some(condition) = &join.condition {
                spec = spec.with_condition(parse_expr(condition));
            }
            builder = builder.join(spec);
        }

        for (key, path) in &self.search.paths {
            let index = key.parse::<usize>().map_err(|_| {
                GridError::config(format!("search path key '{}' is not a column index", key))
            })?;
            builder = builder.search_path(
                index,
                SearchPath::new(
                    Relation::new(&path.table, &path.foreign_key, parse_expr(&path.references)),
                    &path.column,
                ),
            );
        }

        builder.build()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GRIDVIEW_CONFIG`
    /// 2. `./gridview.toml`
    /// 3. `~/.config/gridview/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("GRIDVIEW_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("gridview.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gridview").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a view by name.
    pub fn get_view(&self, name: &str) -> Result<&ViewSettings, SettingsError> {
        self.views
            .get(name)
            .ok_or_else(|| SettingsError::ViewNotFound(name.to_string()))
    }

    /// Build the descriptor of a named view.
    pub fn descriptor(&self, name: &str) -> Result<QueryDescriptor, SettingsError> {
        self.get_view(name)?
            .to_descriptor()
            .map_err(|source| SettingsError::InvalidView {
                name: name.to_string(),
                source,
            })
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = chars.by_ref().take_while(|&ch| ch != '}').collect();
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_')).collect()
        };

        if var_name.is_empty() {
            result.push('$');
            continue;
        }
        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
