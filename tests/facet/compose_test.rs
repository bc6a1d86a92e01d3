use std::sync::Arc;

use drilldown::executor::SqliteExecutor;
use drilldown::facet::{compose, AppliedFilter, FacetContext, Filter};
use drilldown::schema::{FieldDescriptor, FieldType};
use drilldown::sql::{star, Dialect, JoinType};
use sqlparser::dialect::{MsSqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

fn events(name: &str, descriptor: FieldDescriptor) -> Arc<Filter> {
    Arc::new(Filter::new(name, "Events", descriptor))
}

fn list_field() -> FieldDescriptor {
    FieldDescriptor::new(FieldType::Text).list(";")
}

#[test]
fn test_list_filters_each_join_their_own_table() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let applied = [
        AppliedFilter::with_value(events("Tags", list_field()), "alpha"),
        AppliedFilter::with_value(events("Categories", list_field()), "news"),
    ];

    let parts = compose(&status, &FacetContext::new(&applied));

    assert_eq!(parts.tables(), ["Events", "Events__Tags", "Events__Categories"]);
    assert_eq!(parts.joins().len(), 2);
    assert_eq!(parts.conditions().len(), 2);

    let tags = parts.join("Events__Tags").unwrap();
    assert_eq!(tags.join_type, JoinType::Left);
    assert_eq!(
        tags.on.to_sql(Dialect::Sqlite),
        "\"Events\".\"_ID\" = \"Events__Tags\".\"_rowID\""
    );
    let categories = parts.join("Events__Categories").unwrap();
    assert_eq!(
        categories.on.to_sql(Dialect::Sqlite),
        "\"Events\".\"_ID\" = \"Events__Categories\".\"_rowID\""
    );
}

#[test]
fn test_repeated_list_facet_joins_once() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let tags = events("Tags", list_field());
    let applied = [
        AppliedFilter::with_value(tags.clone(), "alpha"),
        AppliedFilter::with_value(tags, "beta"),
    ];

    let parts = compose(&status, &FacetContext::new(&applied));
    assert_eq!(parts.tables(), ["Events", "Events__Tags"]);
    assert_eq!(parts.joins().len(), 1);
    assert_eq!(parts.conditions().len(), 2);

    let sql = parts.to_query(vec![star().into()]).to_sql(Dialect::Sqlite);
    assert_eq!(sql.matches("JOIN").count(), 1);
}

#[test]
fn test_hierarchy_joins_from_base_column() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let applied = [AppliedFilter::with_value(
        events("Genre", FieldDescriptor::new(FieldType::Text).hierarchy()),
        "Rock",
    )];

    let parts = compose(&status, &FacetContext::new(&applied));
    assert_eq!(parts.tables(), ["Events", "Events__Genre__hierarchy"]);
    assert_eq!(
        parts
            .join("Events__Genre__hierarchy")
            .map(|j| j.on.to_sql(Dialect::Sqlite)),
        Some("\"Events\".\"Genre\" = \"Events__Genre__hierarchy\".\"_value\"".to_string())
    );
}

#[test]
fn test_list_hierarchy_joins_through_child_table() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let applied = [AppliedFilter::with_value(
        events("Genre", list_field().hierarchy()),
        "Rock",
    )];

    let parts = compose(&status, &FacetContext::new(&applied));
    assert_eq!(
        parts.tables(),
        ["Events", "Events__Genre", "Events__Genre__hierarchy"]
    );
    assert_eq!(
        parts
            .join("Events__Genre__hierarchy")
            .map(|j| j.on.to_sql(Dialect::Sqlite)),
        Some("\"Events__Genre\".\"_value\" = \"Events__Genre__hierarchy\".\"_value\"".to_string())
    );
}

#[test]
fn test_search_term_adds_text_tables() {
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text))
        .searchable(true, true)
        .into_shared();
    let ctx = FacetContext::new(&[]).with_search_term("rock");

    let parts = compose(&status, &ctx);
    assert_eq!(parts.tables(), ["Events", "_pageData", "_fileData"]);
    assert_eq!(parts.conditions().len(), 1);
}

#[test]
fn test_no_search_term_no_applied_filters() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let parts = compose(&status, &FacetContext::new(&[]));
    assert_eq!(parts.tables(), ["Events"]);
    assert!(parts.conditions().is_empty());
    assert!(parts.joins().is_empty());
}

#[test]
fn test_composed_sql_parses_in_each_dialect() {
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text))
        .searchable(true, false)
        .into_shared();
    let applied = [
        AppliedFilter::with_value(events("Tags", list_field()), "_none"),
        AppliedFilter::with_value(
            events("Genre", FieldDescriptor::new(FieldType::Text).hierarchy()),
            "Rock",
        ),
    ];
    let ctx = FacetContext::new(&applied).with_search_term("it's");
    let query = status.values_query(&ctx);

    Parser::parse_sql(&SQLiteDialect {}, &query.to_sql(Dialect::Sqlite)).unwrap();
    Parser::parse_sql(&PostgreSqlDialect {}, &query.to_sql(Dialect::Postgres)).unwrap();
}

#[test]
fn test_tsql_search_condition() {
    let status = Filter::new("Status", "Events", FieldDescriptor::new(FieldType::Text))
        .searchable(true, false)
        .into_shared();
    let ctx = FacetContext::new(&[]).with_search_term("it's");
    let parts = compose(&status, &ctx);

    // sqlparser's MsSqlDialect reads `\'` as an escaped quote, so T-SQL
    // search output is pinned instead of parsed.
    insta::assert_snapshot!(parts.conditions()[0].to_sql(Dialect::TSql), @r#"[_pageData].[_fullText] LIKE N'%it''s%' ESCAPE N'\'"#);
}

#[test]
fn test_tsql_composed_sql_parses_without_search() {
    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let applied = [
        AppliedFilter::with_value(events("Tags", list_field()), "_none"),
        AppliedFilter::with_value(
            events("Genre", FieldDescriptor::new(FieldType::Text).hierarchy()),
            "Rock",
        ),
    ];
    let query = status.values_query(&FacetContext::new(&applied));

    Parser::parse_sql(&MsSqlDialect {}, &query.to_sql(Dialect::TSql)).unwrap();
}

#[test]
fn test_composed_query_runs_against_sqlite() {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor
        .connection()
        .execute_batch(
            r#"
CREATE TABLE Events (_ID INTEGER, _pageID INTEGER, Status TEXT);
CREATE TABLE Events__Tags (_rowID INTEGER, _value TEXT);
CREATE TABLE Events__Categories (_rowID INTEGER, _value TEXT);
INSERT INTO Events VALUES (1, 10, 'open'), (2, 20, 'open'), (3, 30, 'closed');
INSERT INTO Events__Tags VALUES (1, 'alpha'), (2, 'alpha'), (3, 'beta');
INSERT INTO Events__Categories VALUES (1, 'news'), (2, 'sports'), (3, 'news');
"#,
        )
        .unwrap();

    let status = events("Status", FieldDescriptor::new(FieldType::Text));
    let applied = [
        AppliedFilter::with_value(events("Tags", list_field()), "alpha"),
        AppliedFilter::with_value(events("Categories", list_field()), "news"),
    ];

    let counts = status
        .possible_values(&executor, &FacetContext::new(&applied))
        .unwrap();
    assert_eq!(counts.into_vec(), vec![("open".to_string(), 1)]);
}

#[test]
fn test_list_facet_values_with_other_list_applied() {
    let categories = events("Categories", list_field());
    let applied = [AppliedFilter::with_value(events("Tags", list_field()), "alpha")];
    let sql = categories
        .values_query(&FacetContext::new(&applied))
        .to_sql(Dialect::Sqlite);

    assert_eq!(sql.matches("JOIN \"Events__Tags\"").count(), 1);
    assert_eq!(sql.matches("JOIN \"Events__Categories\"").count(), 1);
}

#[test]
fn test_applied_list_facet_values_join_its_table_once() {
    let categories = events("Categories", list_field());
    let applied = [
        AppliedFilter::with_value(events("Tags", list_field()), "alpha"),
        AppliedFilter::with_value(categories.clone(), "news"),
    ];
    let ctx = FacetContext::new(&applied);
    let sql = drilldown::facet::aggregate::values_query(&categories, &ctx, true).to_sql(Dialect::Sqlite);

    assert_eq!(sql.matches("JOIN \"Events__Categories\"").count(), 1);
    assert!(!sql.contains("WHERE"));
}
