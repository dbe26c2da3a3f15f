//! Configuration module for gridview.
//!
//! Loads named grid views and the database they run against from TOML.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, JoinSettings, OrderSettings, SearchPathSettings,
    SearchSettings, Settings, SettingsError, ViewSettings,
};
