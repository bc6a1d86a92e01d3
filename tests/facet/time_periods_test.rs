use std::sync::Arc;

use drilldown::executor::SqliteExecutor;
use drilldown::facet::{AppliedFilter, FacetContext, Filter, TimeGranularity, NONE_KEY};
use drilldown::schema::{FieldDescriptor, FieldType};
use drilldown::sql::Dialect;

/// `Events` with a date field `when`, its precision column and a `Status`.
fn executor_with(rows: &[(&str, i64, &str)]) -> SqliteExecutor {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    let conn = executor.connection();
    conn.execute_batch(
        "CREATE TABLE Events (_ID INTEGER PRIMARY KEY, _pageID INTEGER, \"when\" TEXT, when__precision INTEGER, Status TEXT);",
    )
    .unwrap();
    for (i, (date, precision, status)) in rows.iter().enumerate() {
        let date = (!date.is_empty()).then_some(*date);
        conn.execute(
            "INSERT INTO Events (_pageID, \"when\", when__precision, Status) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![i as i64 + 100, date, precision, status],
        )
        .unwrap();
    }
    executor
}

fn when() -> Arc<Filter> {
    Filter::new("when", "Events", FieldDescriptor::new(FieldType::Date)).into_shared()
}

#[test]
fn test_decades_over_three_decades() {
    let executor = executor_with(&[
        ("1990-01-01", 1, "open"),
        ("1995-06-15", 1, "open"),
        ("2021-11-30", 1, "open"),
    ]);
    let filter = when();
    let ctx = FacetContext::new(&[]);

    assert_eq!(
        filter.time_granularity(&executor, &ctx).unwrap(),
        Some(TimeGranularity::Decade)
    );

    let periods = filter.possible_time_periods(&executor, &ctx).unwrap();
    assert_eq!(
        periods.into_vec(),
        vec![
            ("1990 - 1999".to_string(), 2),
            ("2020 - 2029".to_string(), 1),
        ]
    );
}

#[test]
fn test_decade_merges_years() {
    let executor = executor_with(&[
        ("1950-03-01", 1, "open"),
        ("1994-01-01", 3, "open"),
        ("1999-12-31", 1, "open"),
        ("1994-05-05", 1, "open"),
    ]);
    let periods = when()
        .possible_time_periods(&executor, &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(periods.get("1950 - 1959"), Some(1));
    assert_eq!(periods.get("1990 - 1999"), Some(3));
    assert_eq!(periods.len(), 2);
}

#[test]
fn test_months_within_a_quarter() {
    let executor = executor_with(&[
        ("2024-01-05", 1, "open"),
        ("2024-01-20", 1, "open"),
        ("2024-03-02", 1, "open"),
    ]);
    let filter = when();
    let ctx = FacetContext::new(&[]);

    assert_eq!(
        filter.time_granularity(&executor, &ctx).unwrap(),
        Some(TimeGranularity::Month)
    );
    let periods = filter.possible_time_periods(&executor, &ctx).unwrap();
    assert_eq!(
        periods.into_vec(),
        vec![
            ("January 2024".to_string(), 2),
            ("March 2024".to_string(), 1),
        ]
    );
}

#[test]
fn test_month_buckets_skip_year_only_dates() {
    let executor = executor_with(&[
        ("2024-01-05", 1, "open"),
        ("2024-01-01", 3, "open"),
        ("2024-03-01", 2, "open"),
    ]);
    let periods = when()
        .possible_time_periods(&executor, &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(periods.get("January 2024"), Some(1));
    assert_eq!(periods.get("March 2024"), Some(1));
}

#[test]
fn test_days_within_a_month() {
    let executor = executor_with(&[
        ("2024-02-03", 1, "open"),
        ("2024-02-03", 0, "open"),
        ("2024-02-17", 1, "open"),
        ("2024-02-20", 2, "open"),
    ]);
    let periods = when()
        .possible_time_periods(&executor, &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(
        periods.into_vec(),
        vec![
            ("February 3, 2024".to_string(), 2),
            ("February 17, 2024".to_string(), 1),
        ]
    );
}

#[test]
fn test_blank_dates_go_to_none() {
    let executor = executor_with(&[
        ("2001-01-01", 1, "open"),
        ("2010-06-01", 1, "open"),
        ("", 1, "open"),
    ]);
    let periods = when()
        .possible_time_periods(&executor, &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(periods.get(NONE_KEY), Some(1));
    assert_eq!(periods.get("2001"), Some(1));
    assert_eq!(periods.get("2010"), Some(1));
}

#[test]
fn test_empty_text_dates_do_not_widen_the_extent() {
    let executor = executor_with(&[("2024-01-05", 1, "open"), ("2024-03-02", 1, "open")]);
    executor
        .connection()
        .execute_batch(
            "INSERT INTO Events (_pageID, \"when\", when__precision, Status) VALUES (999, '', 1, 'open');",
        )
        .unwrap();
    let filter = when();
    let ctx = FacetContext::new(&[]);

    assert_eq!(
        filter.time_granularity(&executor, &ctx).unwrap(),
        Some(TimeGranularity::Month)
    );
    let periods = filter.possible_time_periods(&executor, &ctx).unwrap();
    assert_eq!(periods.get("January 2024"), Some(1));
    assert_eq!(periods.get("March 2024"), Some(1));
    assert_eq!(periods.get(NONE_KEY), Some(1));
    assert_eq!(periods.len(), 3);
}

#[test]
fn test_no_dates_no_granularity() {
    let executor = executor_with(&[]);
    let filter = when();
    let ctx = FacetContext::new(&[]);

    assert_eq!(filter.time_granularity(&executor, &ctx).unwrap(), None);
    assert!(filter.possible_time_periods(&executor, &ctx).unwrap().is_empty());
}

#[test]
fn test_non_date_facet_has_no_periods() {
    let executor = executor_with(&[("2024-01-01", 1, "open")]);
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text));
    let ctx = FacetContext::new(&[]);

    assert_eq!(status.time_granularity(&executor, &ctx).unwrap(), None);
    assert!(status.possible_time_periods(&executor, &ctx).unwrap().is_empty());
}

#[test]
fn test_applied_filters_narrow_the_extent() {
    let executor = executor_with(&[
        ("1950-01-01", 1, "closed"),
        ("2024-01-05", 1, "open"),
        ("2024-03-02", 1, "open"),
    ]);
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text)).into_shared();
    let applied = [AppliedFilter::with_value(status, "open")];
    let ctx = FacetContext::new(&applied);

    assert_eq!(
        when().time_granularity(&executor, &ctx).unwrap(),
        Some(TimeGranularity::Month)
    );
}

#[test]
fn test_groups_by_expression_not_alias() {
    let query = when().time_periods_query(&FacetContext::new(&[]), TimeGranularity::Day);
    let sql = query.to_sql(Dialect::TSql);
    assert!(sql.contains("GROUP BY YEAR("));
    assert!(!sql.contains("GROUP BY [year_field]"));
}
