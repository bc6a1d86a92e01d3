//! TOML-based configuration for the drill-down engine.
//!
//! Supports a config file (drilldown.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! dialect = "sqlite"
//! table_prefix = "cargo__"
//! database = "${DATA_DIR}/cargo.sqlite"
//!
//! [display]
//! american_dates = false
//! hour_24 = true
//!
//! [tables.Events]
//! searchable_pages = true
//!
//! [tables.Events.fields.when]
//! type = "Date"
//!
//! [tables.Events.fields.Tags]
//! type = "Text"
//! list = true
//! delimiter = ";"
//! required_filters = ["when"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::display::DisplaySettings;
use crate::facet::Filter;
use crate::schema::{Catalog, FieldDescriptor, FieldType, SchemaCatalog, SchemaError, TableSchema};
use crate::search::LikeSearch;
use crate::sql::Dialect;

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
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query generation and storage.
    pub engine: EngineSettings,

    /// Value formatting.
    pub display: DisplaySettings,

    /// Facet tables by logical name.
    pub tables: BTreeMap<String, TableSettings>,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Dialect composed SQL is rendered in.
    pub dialect: Dialect,

    /// Prepended to every table name, including the full-text tables.
    pub table_prefix: String,

    /// SQLite database file (supports ${ENV_VAR} expansion).
    pub database: Option<String>,
}

impl EngineSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_database(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.database
            .as_deref()
            .map(|db| expand_env_vars(db).map(PathBuf::from))
            .transpose()
    }
}

/// Table configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TableSettings {
    /// Full-text search covers the text of the owning pages.
    pub searchable_pages: bool,

    /// Full-text search covers the text of attached files.
    pub searchable_files: bool,

    /// Fields by name.
    pub fields: BTreeMap<String, FieldSettings>,
}

/// Field configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldSettings {
    /// Declared type name, e.g. "Date" or "Page".
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default)]
    pub list: bool,

    /// Separator of list values (default ";").
    #[serde(default)]
    pub delimiter: Option<String>,

    #[serde(default)]
    pub hierarchy: bool,

    /// Facets to apply before this one is offered.
    #[serde(default)]
    pub required_filters: Vec<String>,

    /// Values offered for selection.
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

impl FieldSettings {
    /// Build the field descriptor, rejecting unknown type names.
    pub fn descriptor(&self, name: &str) -> Result<FieldDescriptor, SchemaError> {
        let field_type: FieldType =
            self.field_type
                .parse()
                .map_err(|_| SchemaError::UnknownFieldType {
                    field: name.to_string(),
                    field_type: self.field_type.clone(),
                })?;

        let mut descriptor = FieldDescriptor::new(field_type);
        if self.list {
            let delimiter = self
                .delimiter
                .as_deref()
                .unwrap_or(FieldDescriptor::DEFAULT_DELIMITER);
            descriptor = descriptor.list(delimiter);
        }
        if self.hierarchy {
            descriptor = descriptor.hierarchy();
        }
        Ok(descriptor)
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DRILLDOWN_CONFIG`
    /// 2. `./drilldown.toml`
    /// 3. `~/.config/drilldown/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("DRILLDOWN_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("drilldown.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("drilldown").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Physical name of logical table `table`.
    pub fn physical_table(&self, table: &str) -> String {
        format!("{}{}", self.engine.table_prefix, table)
    }

    /// Full-text search provider over the prefixed text tables.
    pub fn search_provider(&self) -> LikeSearch {
        LikeSearch::with_prefix(&self.engine.table_prefix)
    }

    /// Schema catalog of every configured table, keyed by logical name.
    pub fn catalog(&self) -> Result<Catalog, SchemaError> {
        let mut catalog = Catalog::new();
        for (table_name, table) in &self.tables {
            let mut schema = TableSchema {
                searchable_pages: table.searchable_pages,
                searchable_files: table.searchable_files,
                ..TableSchema::new()
            };
            for (field_name, field) in &table.fields {
                schema = schema.with_field(field_name, field.descriptor(field_name)?);
            }
            catalog.add_table(table_name, schema);
        }
        Ok(catalog)
    }

    /// Every facet of logical table `table`, bound to its physical table.
    pub fn filters(&self, table: &str) -> Result<Vec<Arc<Filter>>, SchemaError> {
        let settings = self
            .tables
            .get(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()))?;
        let catalog = self.catalog()?;

        settings
            .fields
            .keys()
            .map(|field| self.build_filter(&catalog, table, field).map(Arc::new))
            .collect()
    }

    /// A single facet of logical table `table`.
    pub fn filter(&self, table: &str, field: &str) -> Result<Arc<Filter>, SchemaError> {
        let catalog = self.catalog()?;
        self.build_filter(&catalog, table, field).map(Arc::new)
    }

    fn build_filter(
        &self,
        catalog: &dyn SchemaCatalog,
        table: &str,
        field: &str,
    ) -> Result<Filter, SchemaError> {
        let mut filter = Filter::from_catalog(catalog, table, field)?;
        filter.table_name = self.physical_table(table);

        if let Some(field_settings) = self.tables.get(table).and_then(|t| t.fields.get(field)) {
            for required in &field_settings.required_filters {
                filter.add_required_filter(required);
            }
            filter.possible_applied_filters = field_settings.allowed_values.clone();
        }
        Ok(filter)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            // ${VAR}
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
