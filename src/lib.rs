//! # Drilldown
//!
//! A faceted drill-down query engine that composes multi-dialect SQL over
//! tabular stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Settings (tables, fields, dialect, prefix)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Filter (one facet) + AppliedFilter selections     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [facet::compose]
//! ┌─────────────────────────────────────────────────────────┐
//! │        QueryParts (tables, joins, conditions)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [facet::aggregate]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query → SQL (per dialect) → QueryExecutor         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//!              FacetCounts (" none", decades, months)
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod executor;
pub mod facet;
pub mod schema;
pub mod search;
pub mod sql;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::error::{DrilldownError, DrilldownResult};
    pub use crate::executor::{QueryExecutor, SqliteExecutor, Value};
    pub use crate::facet::{
        AppliedFilter, FacetContext, FacetCounts, Filter, FilterValue, QueryParts,
        TimeGranularity, NONE_KEY,
    };
    pub use crate::schema::{Catalog, FieldDescriptor, FieldType, SchemaCatalog, TableSchema};
    pub use crate::search::{FullTextSearch, LikeSearch};
}

// Also export at crate root for convenience
pub use dialect::Dialect;
pub use error::{DrilldownError, DrilldownResult};
pub use facet::{AppliedFilter, FacetContext, FacetCounts, Filter, TimeGranularity};
pub use query::Query;
