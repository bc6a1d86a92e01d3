//! Configuration module for the drill-down engine.
//!
//! Handles the TOML settings file, environment variables, and building the
//! schema catalog and facets from it.

mod settings;

pub use settings::{
    expand_env_vars, EngineSettings, FieldSettings, Settings, SettingsError, TableSettings,
};
