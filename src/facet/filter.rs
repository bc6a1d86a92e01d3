//! Facet definitions.

use std::sync::Arc;

use crate::executor::{ExecutionError, QueryExecutor};
use crate::schema::{FieldDescriptor, SchemaCatalog, SchemaError};
use crate::sql::Query;

use super::aggregate::{self, FacetCounts};
use super::compose::{compose, QueryParts};
use super::granularity::{fetch_granularity, TimeGranularity};
use super::FacetContext;

/// A facet: one field of a base table that results can be narrowed by.
///
/// Identified by `(table_name, name)`. Built once when the schema is loaded
/// and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    /// Physical base table name.
    pub table_name: String,
    pub descriptor: FieldDescriptor,
    pub searchable_pages: bool,
    pub searchable_files: bool,
    /// Facets that should be applied before this one is offered.
    pub required_filters: Vec<String>,
    /// Values offered for selection. Selecting "other" matches everything else.
    pub possible_applied_filters: Vec<String>,
}

impl Filter {
    pub fn new(name: &str, table_name: &str, descriptor: FieldDescriptor) -> Self {
        Self {
            name: name.to_string(),
            table_name: table_name.to_string(),
            descriptor,
            searchable_pages: false,
            searchable_files: false,
            required_filters: Vec::new(),
            possible_applied_filters: Vec::new(),
        }
    }

    /// Build the facet for `table.field` from a catalog.
    pub fn from_catalog(
        catalog: &dyn SchemaCatalog,
        table: &str,
        field: &str,
    ) -> Result<Self, SchemaError> {
        let schema = catalog.table(table)?;
        let descriptor = catalog.field(table, field)?.clone();
        Ok(Self {
            searchable_pages: schema.searchable_pages,
            searchable_files: schema.searchable_files,
            ..Self::new(field, table, descriptor)
        })
    }

    pub fn searchable(mut self, pages: bool, files: bool) -> Self {
        self.searchable_pages = pages;
        self.searchable_files = files;
        self
    }

    pub fn add_required_filter(&mut self, name: &str) {
        self.required_filters.push(name.to_string());
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Whether one of `applied` is a selection on this facet.
    pub fn is_applied_in(&self, ctx: &FacetContext<'_>) -> bool {
        ctx.applied().iter().any(|af| af.is_on(self))
    }

    /// Tables, conditions and joins of the row set this facet is counted over.
    pub fn query_parts(&self, ctx: &FacetContext<'_>) -> QueryParts {
        compose(self, ctx)
    }

    /// The grouped query [`Filter::possible_values`] runs, for inspection.
    pub fn values_query(&self, ctx: &FacetContext<'_>) -> Query {
        aggregate::values_query(self, ctx, false)
    }

    /// The grouped query [`Filter::possible_time_periods`] runs at `granularity`.
    pub fn time_periods_query(&self, ctx: &FacetContext<'_>, granularity: TimeGranularity) -> Query {
        aggregate::time_periods_query(self, ctx, granularity)
    }

    /// Values still possible under `ctx`, with the number of rows each yields.
    pub fn possible_values(
        &self,
        executor: &dyn QueryExecutor,
        ctx: &FacetContext<'_>,
    ) -> Result<FacetCounts, ExecutionError> {
        aggregate::aggregate_values(self, executor, ctx, false)
    }

    /// Every value of a facet that is itself applied, ignoring the conditions
    /// of `ctx` so the selection can be widened again.
    pub fn applied_values(
        &self,
        executor: &dyn QueryExecutor,
        ctx: &FacetContext<'_>,
    ) -> Result<FacetCounts, ExecutionError> {
        aggregate::aggregate_values(self, executor, ctx, true)
    }

    /// Time-period buckets of a date facet under `ctx`.
    pub fn possible_time_periods(
        &self,
        executor: &dyn QueryExecutor,
        ctx: &FacetContext<'_>,
    ) -> Result<FacetCounts, ExecutionError> {
        aggregate::aggregate_time_periods(self, executor, ctx)
    }

    /// Bucket resolution a date facet would use under `ctx`.
    pub fn time_granularity(
        &self,
        executor: &dyn QueryExecutor,
        ctx: &FacetContext<'_>,
    ) -> Result<Option<TimeGranularity>, ExecutionError> {
        fetch_granularity(self, executor, ctx)
    }
}
