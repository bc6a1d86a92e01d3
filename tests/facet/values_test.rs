use std::sync::Arc;

use chrono::NaiveDate;
use drilldown::executor::SqliteExecutor;
use drilldown::facet::{AppliedFilter, FacetContext, Filter, FilterValue, NONE_KEY};
use drilldown::schema::{FieldDescriptor, FieldType};

const SCHEMA: &str = r#"
CREATE TABLE Events (_ID INTEGER PRIMARY KEY, _pageID INTEGER, Status TEXT, Genre TEXT);
CREATE TABLE Events__Tags (_rowID INTEGER, _value TEXT);
CREATE TABLE Events__Genre__hierarchy (_value TEXT, _left INTEGER, _right INTEGER);
CREATE TABLE _pageData (_pageID INTEGER, _fullText TEXT);
CREATE TABLE _fileData (_pageID INTEGER, _fullText TEXT);

INSERT INTO Events VALUES
    (1, 10, 'open', 'Punk'),
    (2, 20, 'open', 'Jazz'),
    (3, 30, 'closed', 'Rock'),
    (4, 40, NULL, 'Bebop'),
    (5, 50, '', NULL);

INSERT INTO Events__Tags VALUES
    (1, 'alpha'), (1, 'beta'),
    (2, 'alpha'),
    (3, 'gamma');

-- Music > (Rock > Punk), (Jazz > Bebop)
INSERT INTO Events__Genre__hierarchy VALUES
    ('Music', 1, 12),
    ('Rock', 2, 5),
    ('Punk', 3, 4),
    ('Jazz', 6, 9),
    ('Bebop', 7, 8);

INSERT INTO _pageData VALUES
    (10, 'a loud rock show'),
    (20, 'quiet evening'),
    (30, 'rock and roll');

INSERT INTO _fileData VALUES
    (20, 'rock poster'),
    (20, 'rock setlist');
"#;

fn executor() -> SqliteExecutor {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.connection().execute_batch(SCHEMA).unwrap();
    executor
}

fn status() -> Arc<Filter> {
    Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text)).into_shared()
}

fn tags() -> Arc<Filter> {
    Filter::new("Tags", "Events", FieldDescriptor::new(FieldType::Text).list(";")).into_shared()
}

fn genre() -> Arc<Filter> {
    Filter::new("Genre", "Events", FieldDescriptor::new(FieldType::Text).hierarchy()).into_shared()
}

#[test]
fn test_blank_values_share_the_none_key() {
    let counts = status()
        .possible_values(&executor(), &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(counts.get(NONE_KEY), Some(2));
    assert_eq!(counts.get("open"), Some(2));
    assert_eq!(counts.get("closed"), Some(1));
    assert_eq!(counts.len(), 3);
}

#[test]
fn test_list_values_count_child_rows() {
    let counts = tags()
        .possible_values(&executor(), &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(counts.get("alpha"), Some(2));
    assert_eq!(counts.get("beta"), Some(1));
    assert_eq!(counts.get("gamma"), Some(1));
    // Events 4 and 5 have no tags.
    assert_eq!(counts.get(NONE_KEY), Some(2));
}

#[test]
fn test_applied_filter_narrows_other_facet() {
    let applied = [AppliedFilter::with_value(tags(), "alpha")];
    let counts = status()
        .possible_values(&executor(), &FacetContext::new(&applied))
        .unwrap();

    assert_eq!(counts.into_vec(), vec![("open".to_string(), 2)]);
}

#[test]
fn test_none_selection() {
    let applied = [AppliedFilter::new(status()).value(FilterValue::None)];
    let counts = tags()
        .possible_values(&executor(), &FacetContext::new(&applied))
        .unwrap();

    assert_eq!(counts.into_vec(), vec![(NONE_KEY.to_string(), 2)]);
}

#[test]
fn test_other_selection_excludes_offered_values() {
    let mut filter = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text));
    filter.possible_applied_filters = vec!["open".into(), "".into()];
    let applied = [AppliedFilter::new(Arc::new(filter)).value(FilterValue::Other)];

    let counts = tags()
        .possible_values(&executor(), &FacetContext::new(&applied))
        .unwrap();
    assert_eq!(counts.into_vec(), vec![("gamma".to_string(), 1)]);
}

#[test]
fn test_hierarchy_selection_includes_descendants() {
    let applied = [AppliedFilter::with_value(genre(), "Rock")];
    let counts = status()
        .possible_values(&executor(), &FacetContext::new(&applied))
        .unwrap();

    assert_eq!(counts.get("open"), Some(1));
    assert_eq!(counts.get("closed"), Some(1));
    assert_eq!(counts.len(), 2);
}

#[test]
fn test_applied_values_ignore_conditions() {
    let status = status();
    let applied = [
        AppliedFilter::with_value(status.clone(), "open"),
        AppliedFilter::with_value(tags(), "gamma"),
    ];
    let ctx = FacetContext::new(&applied);

    let counts = status.applied_values(&executor(), &ctx).unwrap();
    assert_eq!(counts.get("open"), Some(2));
    assert_eq!(counts.get("closed"), Some(1));
    assert_eq!(counts.get(NONE_KEY), Some(2));
}

#[test]
fn test_applied_list_values_list_every_value() {
    let tags = tags();
    let applied = [AppliedFilter::with_value(tags.clone(), "beta")];
    let counts = tags
        .applied_values(&executor(), &FacetContext::new(&applied))
        .unwrap();

    assert_eq!(counts.get("alpha"), Some(2));
    assert_eq!(counts.get("beta"), Some(1));
    assert_eq!(counts.get("gamma"), Some(1));
}

#[test]
fn test_search_term_over_pages() {
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text))
        .searchable(true, false)
        .into_shared();
    let ctx = FacetContext::new(&[]).with_search_term("rock");

    let counts = status.possible_values(&executor(), &ctx).unwrap();
    assert_eq!(counts.get("open"), Some(1));
    assert_eq!(counts.get("closed"), Some(1));
    assert_eq!(counts.len(), 2);
}

#[test]
fn test_searchable_files_count_pages_once() {
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text))
        .searchable(false, true)
        .into_shared();
    let ctx = FacetContext::new(&[]).with_search_term("rock");

    // Page 20 matches through two files but is one event.
    let counts = status.possible_values(&executor(), &ctx).unwrap();
    assert_eq!(counts.into_vec(), vec![("open".to_string(), 1)]);
}

#[test]
fn test_values_are_ordered() {
    let counts = tags()
        .possible_values(&executor(), &FacetContext::new(&[]))
        .unwrap();

    assert_eq!(
        counts.keys().collect::<Vec<_>>(),
        [NONE_KEY, "alpha", "beta", "gamma"]
    );
}

#[test]
fn test_counts_serialize_as_ordered_map() {
    let counts = status()
        .possible_values(&executor(), &FacetContext::new(&[]))
        .unwrap();

    let json = serde_json::to_string(&counts).unwrap();
    assert_eq!(json, r#"{" none":2,"closed":1,"open":2}"#);
}

#[test]
fn test_datetime_range_includes_the_upper_day() {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor
        .connection()
        .execute_batch(
            r#"
CREATE TABLE Shows (_ID INTEGER PRIMARY KEY, _pageID INTEGER, starts TEXT, Status TEXT);
INSERT INTO Shows VALUES
    (1, 10, '1998-12-31 23:00:00', 'early'),
    (2, 20, '1999-06-01 00:00:00', 'mid'),
    (3, 30, '1999-12-31 10:00:00', 'late'),
    (4, 40, '2000-01-01 00:00:00', 'next');
"#,
        )
        .unwrap();

    let starts = Filter::new("starts", "Shows", FieldDescriptor::new(FieldType::Datetime)).into_shared();
    let status = Filter::new("Status", "Shows", FieldDescriptor::new(FieldType::Text));
    let applied = [AppliedFilter::new(starts).date_range(
        NaiveDate::from_ymd_opt(1999, 1, 1),
        NaiveDate::from_ymd_opt(1999, 12, 31),
    )];

    let counts = status
        .possible_values(&executor, &FacetContext::new(&applied))
        .unwrap();
    assert_eq!(
        counts.into_vec(),
        vec![("late".to_string(), 1), ("mid".to_string(), 1)]
    );
}
