//! Field descriptors and the schema catalog that facets are defined against.
//!
//! A facet table is stored as one base table plus derived tables:
//!
//! - `<T>`: one row per record, with `_ID`, `_pageID` and one column per
//!   non-list field. Date fields carry an extra `<field>__precision` column.
//! - `<T>__<F>`: one row per value of list field `F`, keyed by `_rowID`.
//! - `<T>__<F>__hierarchy`: nested-set bounds (`_left`, `_right`) for every
//!   `_value` of hierarchical field `F`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Row id column of a base table.
pub const ROW_ID_COLUMN: &str = "_ID";
/// Owning page id column of a base table.
pub const PAGE_ID_COLUMN: &str = "_pageID";
/// Back-reference from a list table row to its base table row.
pub const ROW_REF_COLUMN: &str = "_rowID";
/// Value column of list and hierarchy tables.
pub const VALUE_COLUMN: &str = "_value";
/// Nested-set lower bound in a hierarchy table.
pub const LEFT_COLUMN: &str = "_left";
/// Nested-set upper bound in a hierarchy table.
pub const RIGHT_COLUMN: &str = "_right";

/// Error type for schema lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown field '{field}' on table '{table}'")]
    UnknownField { table: String, field: String },

    #[error("Unknown field type '{field_type}' for field '{field}'")]
    UnknownFieldType { field: String, field_type: String },
}

// =============================================================================
// Field Types
// =============================================================================

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Date,
    Datetime,
    Boolean,
    Page,
    File,
    Url,
    Email,
    Wikitext,
    Searchtext,
    String,
    Coordinates,
    Rating,
}

impl FieldType {
    /// Name used in schema declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Date => "Date",
            FieldType::Datetime => "Datetime",
            FieldType::Boolean => "Boolean",
            FieldType::Page => "Page",
            FieldType::File => "File",
            FieldType::Url => "URL",
            FieldType::Email => "Email",
            FieldType::Wikitext => "Wikitext",
            FieldType::Searchtext => "Searchtext",
            FieldType::String => "String",
            FieldType::Coordinates => "Coordinates",
            FieldType::Rating => "Rating",
        }
    }

    /// Date-like fields get time-period facets instead of value facets.
    pub fn is_date(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Datetime)
    }

    /// Whether values of this type are matched by search terms rather than
    /// exact values.
    pub fn is_searchable_text(&self) -> bool {
        matches!(self, FieldType::Searchtext)
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "text" => FieldType::Text,
            "integer" => FieldType::Integer,
            "float" => FieldType::Float,
            "date" => FieldType::Date,
            "datetime" => FieldType::Datetime,
            "boolean" => FieldType::Boolean,
            "page" => FieldType::Page,
            "file" => FieldType::File,
            "url" => FieldType::Url,
            "email" => FieldType::Email,
            "wikitext" => FieldType::Wikitext,
            "searchtext" => FieldType::Searchtext,
            "string" => FieldType::String,
            "coordinates" => FieldType::Coordinates,
            "rating" => FieldType::Rating,
            _ => return Err(()),
        };
        Ok(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Date Precision
// =============================================================================

/// How much of a stored date is known.
///
/// Stored as an integer in `<field>__precision`; a lower code is finer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    DateAndTime,
    DateOnly,
    MonthOnly,
    YearOnly,
}

impl DatePrecision {
    pub fn code(&self) -> i64 {
        match self {
            DatePrecision::DateAndTime => 0,
            DatePrecision::DateOnly => 1,
            DatePrecision::MonthOnly => 2,
            DatePrecision::YearOnly => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(DatePrecision::DateAndTime),
            1 => Some(DatePrecision::DateOnly),
            2 => Some(DatePrecision::MonthOnly),
            3 => Some(DatePrecision::YearOnly),
            _ => None,
        }
    }
}

// =============================================================================
// Field Descriptor
// =============================================================================

/// Declared shape of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub is_list: bool,
    pub is_hierarchy: bool,
    pub delimiter: String,
    pub other_params: BTreeMap<String, String>,
}

impl FieldDescriptor {
    pub const DEFAULT_DELIMITER: &'static str = ";";

    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            is_list: false,
            is_hierarchy: false,
            delimiter: Self::DEFAULT_DELIMITER.to_string(),
            other_params: BTreeMap::new(),
        }
    }

    /// Mark the field as list-valued, split on `delimiter`.
    pub fn list(mut self, delimiter: &str) -> Self {
        self.is_list = true;
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn hierarchy(mut self) -> Self {
        self.is_hierarchy = true;
        self
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.other_params.insert(key.to_string(), value.to_string());
        self
    }
}

// =============================================================================
// Table Naming
// =============================================================================

/// Child table holding the values of list field `field`.
pub fn list_table(base_table: &str, field: &str) -> String {
    format!("{base_table}__{field}")
}

/// Nested-set table for hierarchical field `field`.
pub fn hierarchy_table(base_table: &str, field: &str) -> String {
    format!("{base_table}__{field}__hierarchy")
}

/// Column storing the [`DatePrecision`] code of date field `field`.
pub fn precision_column(field: &str) -> String {
    format!("{field}__precision")
}

// =============================================================================
// Catalog
// =============================================================================

/// Schema of one base table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub searchable_pages: bool,
    pub searchable_files: bool,
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.to_string(), descriptor);
        self
    }
}

/// Source of field descriptors, consulted when facets are defined.
pub trait SchemaCatalog: Send + Sync {
    /// Look up a table by name.
    fn table(&self, table: &str) -> Result<&TableSchema, SchemaError>;

    /// Look up a single field.
    fn field(&self, table: &str, field: &str) -> Result<&FieldDescriptor, SchemaError> {
        self.table(table)?
            .fields
            .get(field)
            .ok_or_else(|| SchemaError::UnknownField {
                table: table.to_string(),
                field: field.to_string(),
            })
    }
}

/// In-memory catalog, usually built from [`crate::config::Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, name: &str, schema: TableSchema) -> &mut Self {
        self.tables.insert(name.to_string(), schema);
        self
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl SchemaCatalog for Catalog {
    fn table(&self, table: &str) -> Result<&TableSchema, SchemaError> {
        self.tables
            .get(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()))
    }
}
