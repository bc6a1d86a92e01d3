//! Applied filters: a facet together with the selection made on it.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::schema::{self, FieldType, LEFT_COLUMN, RIGHT_COLUMN, VALUE_COLUMN};
use crate::search::like_contains;
use crate::sql::{
    all_of, always_true, any_of, col, lit_str, table_col, Expr, ExprExt, Query, TableRef,
};

use super::filter::Filter;

/// Escape character used in every generated LIKE pattern.
pub const LIKE_ESCAPE: char = '\\';

/// One selected value of a facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// A concrete value.
    Value(String),
    /// Rows where the field is blank.
    None,
    /// Rows whose value is none of the facet's offered values.
    Other,
}

impl FilterValue {
    /// Parse the `_none` / `_other` markers, anything else is a value.
    pub fn parse(s: &str) -> Self {
        match s {
            "_none" => FilterValue::None,
            "_other" => FilterValue::Other,
            _ => FilterValue::Value(s.to_string()),
        }
    }
}

/// A facet selection contributed by the current request.
#[derive(Debug, Clone)]
pub struct AppliedFilter {
    pub filter: Arc<Filter>,
    /// Alternatives; a row matching any of them passes.
    pub values: Vec<FilterValue>,
    /// Substrings that must all occur (for searchable text fields).
    pub search_terms: Vec<String>,
    pub lower_date: Option<NaiveDate>,
    pub upper_date: Option<NaiveDate>,
}

impl AppliedFilter {
    pub fn new(filter: Arc<Filter>) -> Self {
        Self {
            filter,
            values: Vec::new(),
            search_terms: Vec::new(),
            lower_date: None,
            upper_date: None,
        }
    }

    /// Convenience for the common single-value selection.
    pub fn with_value(filter: Arc<Filter>, value: &str) -> Self {
        Self::new(filter).value(FilterValue::parse(value))
    }

    pub fn value(mut self, value: FilterValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn search_term(mut self, term: &str) -> Self {
        self.search_terms.push(term.to_string());
        self
    }

    pub fn date_range(mut self, lower: Option<NaiveDate>, upper: Option<NaiveDate>) -> Self {
        self.lower_date = lower;
        self.upper_date = upper;
        self
    }

    /// Whether this selection is on `filter`.
    pub fn is_on(&self, filter: &Filter) -> bool {
        self.filter.table_name == filter.table_name && self.filter.name == filter.name
    }

    /// Column the selection compares against.
    fn column(&self) -> Expr {
        let filter = &self.filter;
        if filter.descriptor.is_list {
            table_col(
                &schema::list_table(&filter.table_name, &filter.name),
                VALUE_COLUMN,
            )
        } else {
            table_col(&filter.table_name, &filter.name)
        }
    }

    /// Boolean SQL condition a row must satisfy to pass this filter.
    pub fn check_condition(&self) -> Expr {
        let column = self.column();
        let mut parts = Vec::new();

        let alternatives = self
            .values
            .iter()
            .map(|value| self.value_condition(&column, value))
            .collect();
        if let Some(alternatives) = any_of(alternatives) {
            parts.push(alternatives);
        }

        for term in &self.search_terms {
            parts.push(column.clone().like_escape(lit_str(&like_contains(term)), LIKE_ESCAPE));
        }

        if let Some(lower) = self.lower_date {
            parts.push(column.clone().gte(lower.format("%Y-%m-%d").to_string()));
        }
        if let Some(upper) = self.upper_date {
            parts.push(self.upper_bound(&column, upper));
        }

        all_of(parts).unwrap_or_else(always_true)
    }

    /// Inclusive upper date bound. Datetime text sorts after its bare date,
    /// so the whole upper day is kept by comparing against the next day.
    fn upper_bound(&self, column: &Expr, upper: NaiveDate) -> Expr {
        let next_day = upper
            .succ_opt()
            .filter(|_| self.filter.descriptor.field_type == FieldType::Datetime);
        match next_day {
            Some(next) => column.clone().lt(next.format("%Y-%m-%d").to_string()),
            None => column.clone().lte(upper.format("%Y-%m-%d").to_string()),
        }
    }

    fn value_condition(&self, column: &Expr, value: &FilterValue) -> Expr {
        match value {
            FilterValue::Value(v) if self.filter.descriptor.is_hierarchy => self.subtree_condition(v),
            FilterValue::Value(v) => column.clone().eq(lit_str(v)),
            FilterValue::None => Expr::Paren(Box::new(
                column.clone().is_null().or(column.clone().eq(lit_str(""))),
            )),
            FilterValue::Other => column.clone().not_in_list(
                self.filter
                    .possible_applied_filters
                    .iter()
                    .map(|v| lit_str(v))
                    .collect(),
            ),
        }
    }

    /// Rows whose hierarchy node lies inside the subtree rooted at `value`.
    fn subtree_condition(&self, value: &str) -> Expr {
        let filter = &self.filter;
        let hierarchy_table = schema::hierarchy_table(&filter.table_name, &filter.name);
        let bound = |column: &str| {
            Expr::from(
                Query::new()
                    .select(vec![col(column)])
                    .from(TableRef::new(&hierarchy_table))
                    .filter(col(VALUE_COLUMN).eq(lit_str(value))),
            )
        };

        table_col(&hierarchy_table, LEFT_COLUMN)
            .gte(bound(LEFT_COLUMN))
            .and(table_col(&hierarchy_table, RIGHT_COLUMN).lte(bound(RIGHT_COLUMN)))
    }
}
