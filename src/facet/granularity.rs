//! Time bucketing for date facets.

use std::fmt;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, warn};

use crate::executor::{ExecutionError, QueryExecutor, Value};
use crate::sql::{lit_str, max, min, table_col, ExprExt, Query};

use super::compose::compose;
use super::filter::Filter;
use super::FacetContext;

/// Bucket resolution for a date facet, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    Day,
    Month,
    Year,
    Decade,
}

impl TimeGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Day => "day",
            TimeGranularity::Month => "month",
            TimeGranularity::Year => "year",
            TimeGranularity::Decade => "decade",
        }
    }

    /// Whether buckets carry a month component.
    pub fn has_month(&self) -> bool {
        matches!(self, TimeGranularity::Day | TimeGranularity::Month)
    }

    /// Whether buckets carry a day-of-month component.
    pub fn has_day(&self) -> bool {
        matches!(self, TimeGranularity::Day)
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year, month and day of a stored date. Unknown components are `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateParts {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

impl DateParts {
    pub fn new(year: i64, month: i64, day: i64) -> Self {
        Self { year, month, day }
    }

    /// Split a stored date.
    ///
    /// Structured dates are used as-is. Text is split on `-`; with fewer than
    /// three components only the year is kept. Returns `None` for NULL and
    /// empty text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(text) if text.trim().is_empty() => None,
            Value::Date(date) => Some(Self::new(
                i64::from(date.year()),
                i64::from(date.month()),
                i64::from(date.day()),
            )),
            Value::Int(year) => Some(Self::new(*year, 0, 0)),
            Value::Float(year) => Some(Self::new(*year as i64, 0, 0)),
            Value::Text(text) => Some(Self::parse(text)),
        }
    }

    /// Parse `YYYY-MM-DD`, tolerating trailing time and missing components.
    pub fn parse(text: &str) -> Self {
        let parts: Vec<&str> = text.trim().split('-').collect();
        if parts.len() == 3 {
            Self::new(
                leading_int(parts[0]),
                leading_int(parts[1]),
                leading_int(parts[2]),
            )
        } else {
            warn!(date = text, "date has fewer than three components, using year only");
            Self::new(leading_int(parts[0]), 0, 0)
        }
    }
}

/// Integer value of the leading digits of `s`, `0` if there are none.
fn leading_int(s: &str) -> i64 {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Pick the bucket resolution for dates spanning `min` to `max`.
pub fn select_granularity(min: DateParts, max: DateParts) -> TimeGranularity {
    let year_diff = max.year - min.year;
    let month_diff = 12 * year_diff + (max.month - min.month);

    if year_diff > 30 {
        TimeGranularity::Decade
    } else if year_diff > 2 {
        TimeGranularity::Year
    } else if month_diff > 1 {
        TimeGranularity::Month
    } else {
        TimeGranularity::Day
    }
}

/// `MIN`/`MAX` of the facet's date column over the current row set.
///
/// Blank dates (NULL or `''`) are left out; `''` would otherwise be the minimum.
pub fn extent_query(filter: &Filter, ctx: &FacetContext<'_>) -> Query {
    let date_column = table_col(&filter.table_name, &filter.name);
    let mut parts = compose(filter, ctx);
    parts.add_condition(date_column.clone().ne(lit_str("")));
    parts.to_query(vec![
        min(date_column.clone()).alias("min_date"),
        max(date_column).alias("max_date"),
    ])
}

/// Choose the bucket resolution for date facet `filter`.
///
/// `None` when the facet is not a date or no row in context has a date.
pub fn fetch_granularity(
    filter: &Filter,
    executor: &dyn QueryExecutor,
    ctx: &FacetContext<'_>,
) -> Result<Option<TimeGranularity>, ExecutionError> {
    if !filter.descriptor.field_type.is_date() {
        return Ok(None);
    }

    let Some(row) = executor.fetch_one(&extent_query(filter, ctx))? else {
        return Ok(None);
    };
    let extent = |index: usize| row.get(index).and_then(DateParts::from_value);
    let (Some(min), Some(max)) = (extent(0), extent(1)) else {
        return Ok(None);
    };

    let granularity = select_granularity(min, max);
    debug!(facet = %filter.name, %granularity, ?min, ?max, "selected time granularity");
    Ok(Some(granularity))
}
