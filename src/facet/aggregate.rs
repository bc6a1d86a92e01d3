//! Grouped counts for facet values and time periods.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::display::month_name;
use crate::executor::{ExecutionError, QueryExecutor, Row, Value};
use crate::schema::{self, PAGE_ID_COLUMN, VALUE_COLUMN};
use crate::sql::{
    count_distinct, count_star, date_part, lit_int, table_col, DatePart, Expr, ExprExt,
    OrderByExpr, Query,
};

use super::compose::{compose, main_to_field_join, QueryParts};
use super::filter::Filter;
use super::granularity::{fetch_granularity, TimeGranularity};
use super::FacetContext;

/// Key for rows whose value is blank. The leading space sorts it first and
/// keeps it apart from a real value "none".
pub const NONE_KEY: &str = " none";

/// Value → count pairs in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetCounts {
    entries: Vec<(String, u64)>,
}

impl FacetCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    /// Set the count for `key`, replacing any earlier count.
    pub fn insert(&mut self, key: &str, count: u64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((key.to_string(), count)),
        }
    }

    /// Add `count` to `key`, starting from zero if it is new.
    pub fn add(&mut self, key: &str, count: u64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 += count,
            None => self.entries.push((key.to_string(), count)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, count)| (k.as_str(), *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn into_vec(self) -> Vec<(String, u64)> {
        self.entries
    }
}

impl<'a> FromIterator<(&'a str, u64)> for FacetCounts {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut counts = FacetCounts::new();
        for (key, count) in iter {
            counts.add(key, count);
        }
        counts
    }
}

impl Serialize for FacetCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

// =============================================================================
// Query Construction
// =============================================================================

/// Row count for one group: distinct pages when files are searchable, since
/// a page with several matching files must count once.
pub fn count_expr(filter: &Filter) -> Expr {
    if filter.searchable_files {
        count_distinct(table_col(&filter.table_name, PAGE_ID_COLUMN))
    } else {
        count_star()
    }
}

/// Grouped value/count query for a categorical facet.
///
/// With `is_applied`, `filter` is itself among the applied filters: the
/// conditions are dropped so every value of the facet is listed, and its list
/// table, already joined by the composer, is not joined a second time.
pub fn values_query(filter: &Filter, ctx: &FacetContext<'_>, is_applied: bool) -> Query {
    let base_table = filter.table_name.as_str();
    let mut parts = compose(filter, ctx);

    let column = if filter.descriptor.is_list {
        let field_table = schema::list_table(base_table, &filter.name);
        parts.add_table(&field_table);
        parts.set_join(&field_table, main_to_field_join(base_table, &field_table));
        table_col(&field_table, VALUE_COLUMN)
    } else {
        if is_applied {
            parts = QueryParts::new(base_table);
        }
        table_col(base_table, &filter.name)
    };

    if is_applied {
        parts.clear_conditions();
    }

    parts
        .to_query(vec![
            column.clone().alias("value"),
            count_expr(filter).alias("total"),
        ])
        .group_by(vec![column.clone()])
        .order_by(vec![OrderByExpr::asc(column)])
}

/// Grouped date-part/count query for a date facet at `granularity`.
pub fn time_periods_query(
    filter: &Filter,
    ctx: &FacetContext<'_>,
    granularity: TimeGranularity,
) -> Query {
    let base_table = filter.table_name.as_str();
    let date_column = table_col(base_table, &filter.name);
    let mut parts = compose(filter, ctx);

    let mut keys = vec![date_part(DatePart::Year, date_column.clone())];
    if granularity.has_month() {
        keys.push(date_part(DatePart::Month, date_column.clone()));
    }
    if granularity.has_day() {
        keys.push(date_part(DatePart::Day, date_column));
    }

    // Rows stored with a coarser precision than the buckets are left out.
    let precision = table_col(base_table, &schema::precision_column(&filter.name));
    match granularity {
        TimeGranularity::Month => {
            parts.add_condition(precision.lte(lit_int(schema::DatePrecision::MonthOnly.code())));
        }
        TimeGranularity::Day => {
            parts.add_condition(precision.lte(lit_int(schema::DatePrecision::DateOnly.code())));
        }
        TimeGranularity::Year | TimeGranularity::Decade => {}
    }

    let aliases = ["year_field", "month_field", "day_of_month_field"];
    let mut select: Vec<_> = keys
        .iter()
        .zip(aliases)
        .map(|(key, alias)| key.clone().alias(alias))
        .collect();
    select.push(count_expr(filter).alias("total"));

    // Grouped by expression, not alias: T-SQL cannot GROUP BY an alias.
    parts
        .to_query(select)
        .group_by(keys.clone())
        .order_by(keys.into_iter().map(OrderByExpr::asc).collect())
}

// =============================================================================
// Row Folding
// =============================================================================

fn last_count(row: &[Value]) -> Result<u64, ExecutionError> {
    row.last()
        .ok_or_else(|| ExecutionError::UnexpectedValue {
            column: "total".to_string(),
            found: "empty row".to_string(),
        })?
        .as_count("total")
}

/// Fold `[value, total]` rows into counts, bucketing blanks under [`NONE_KEY`].
pub fn fold_value_rows(rows: &[Row]) -> Result<FacetCounts, ExecutionError> {
    let mut counts = FacetCounts::new();
    for row in rows {
        let total = last_count(row)?;
        match row.first() {
            Some(value) if !value.is_blank() => counts.insert(&value.to_string(), total),
            // NULL and '' both land here, so add rather than overwrite.
            _ => counts.add(NONE_KEY, total),
        }
    }
    Ok(counts)
}

fn date_component(row: &[Value], index: usize, column: &str) -> Result<i64, ExecutionError> {
    let value = row.get(index).unwrap_or(&Value::Null);
    value.as_i64().ok_or_else(|| ExecutionError::UnexpectedValue {
        column: column.to_string(),
        found: value.to_string(),
    })
}

fn month_label(month: i64) -> String {
    u32::try_from(month)
        .ok()
        .and_then(month_name)
        .map(str::to_string)
        .unwrap_or_else(|| month.to_string())
}

/// Fold `[year, (month, (day,)) total]` rows into labelled buckets.
pub fn fold_time_period_rows(
    rows: &[Row],
    granularity: TimeGranularity,
) -> Result<FacetCounts, ExecutionError> {
    let mut counts = FacetCounts::new();
    for row in rows {
        let total = last_count(row)?;
        if row.first().map_or(true, Value::is_blank) {
            counts.add(NONE_KEY, total);
            continue;
        }

        let year = date_component(row, 0, "year_field")?;
        let label = match granularity {
            TimeGranularity::Day => format!(
                "{} {}, {}",
                month_label(date_component(row, 1, "month_field")?),
                date_component(row, 2, "day_of_month_field")?,
                year
            ),
            TimeGranularity::Month => format!(
                "{} {}",
                month_label(date_component(row, 1, "month_field")?),
                year
            ),
            TimeGranularity::Year => year.to_string(),
            TimeGranularity::Decade => {
                let start = year - year.rem_euclid(10);
                format!("{} - {}", start, start + 9)
            }
        };

        // Several year groups fall into one decade; their counts are summed.
        counts.add(&label, total);
    }
    Ok(counts)
}

// =============================================================================
// Aggregation
// =============================================================================

/// Every value `filter` takes in the current context, with its row count.
pub fn aggregate_values(
    filter: &Filter,
    executor: &dyn QueryExecutor,
    ctx: &FacetContext<'_>,
    is_applied: bool,
) -> Result<FacetCounts, ExecutionError> {
    let query = values_query(filter, ctx, is_applied);
    let rows = executor.fetch_all(&query)?;
    let counts = fold_value_rows(&rows)?;
    debug!(facet = %filter.name, values = counts.len(), "aggregated facet values");
    Ok(counts)
}

/// Time-period buckets of date facet `filter` in the current context.
///
/// Empty when the facet is not a date or no row has a date.
pub fn aggregate_time_periods(
    filter: &Filter,
    executor: &dyn QueryExecutor,
    ctx: &FacetContext<'_>,
) -> Result<FacetCounts, ExecutionError> {
    let Some(granularity) = fetch_granularity(filter, executor, ctx)? else {
        return Ok(FacetCounts::new());
    };

    let query = time_periods_query(filter, ctx, granularity);
    let rows = executor.fetch_all(&query)?;
    fold_time_period_rows(&rows, granularity)
}
