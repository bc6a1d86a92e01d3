//! Query-parts composition: the tables, conditions and joins that define the
//! row set a facet is evaluated over.

use std::collections::BTreeMap;

use crate::schema::{self, ROW_ID_COLUMN, ROW_REF_COLUMN, VALUE_COLUMN};
use crate::sql::{all_of, always_true, table_col, Expr, ExprExt, JoinType, Query, SelectExpr, TableRef};

use super::filter::Filter;
use super::FacetContext;

/// How a non-base table is attached to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub join_type: JoinType,
    pub on: Expr,
}

impl JoinCondition {
    pub fn left(on: Expr) -> Self {
        Self {
            join_type: JoinType::Left,
            on,
        }
    }

    pub fn inner(on: Expr) -> Self {
        Self {
            join_type: JoinType::Inner,
            on,
        }
    }
}

/// `LEFT JOIN <field_table> ON <base>._ID = <field_table>._rowID`
pub fn main_to_field_join(base_table: &str, field_table: &str) -> JoinCondition {
    JoinCondition::left(
        table_col(base_table, ROW_ID_COLUMN).eq(table_col(field_table, ROW_REF_COLUMN)),
    )
}

/// `LEFT JOIN <hierarchy_table> ON <field_table>.<column> = <hierarchy_table>._value`
pub fn field_to_hierarchy_join(
    field_table: &str,
    column: &str,
    hierarchy_table: &str,
) -> JoinCondition {
    JoinCondition::left(
        table_col(field_table, column).eq(table_col(hierarchy_table, VALUE_COLUMN)),
    )
}

/// Tables, WHERE conditions and join conditions for one facet query.
///
/// The first table is the base table. Tables are kept unique. Joins are keyed
/// by table name: registering a second join for a table replaces the first.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParts {
    tables: Vec<String>,
    conditions: Vec<Expr>,
    joins: BTreeMap<String, JoinCondition>,
}

impl QueryParts {
    /// Parts selecting every row of `base_table`.
    pub fn new(base_table: &str) -> Self {
        Self {
            tables: vec![base_table.to_string()],
            conditions: Vec::new(),
            joins: BTreeMap::new(),
        }
    }

    /// Parts with no base table, as returned by search providers.
    pub fn empty() -> Self {
        Self {
            tables: Vec::new(),
            conditions: Vec::new(),
            joins: BTreeMap::new(),
        }
    }

    pub fn base_table(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }

    pub fn joins(&self) -> &BTreeMap<String, JoinCondition> {
        &self.joins
    }

    pub fn join(&self, table: &str) -> Option<&JoinCondition> {
        self.joins.get(table)
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    /// Add a table unless it is already present.
    pub fn add_table(&mut self, table: &str) -> &mut Self {
        if !self.has_table(table) {
            self.tables.push(table.to_string());
        }
        self
    }

    pub fn add_condition(&mut self, condition: Expr) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Register the join for `table`, returning the one it replaced.
    pub fn set_join(&mut self, table: &str, join: JoinCondition) -> Option<JoinCondition> {
        self.joins.insert(table.to_string(), join)
    }

    /// Append `other`'s tables and conditions; its joins win on conflict.
    pub fn merge(&mut self, other: QueryParts) -> &mut Self {
        for table in &other.tables {
            self.add_table(table);
        }
        self.conditions.extend(other.conditions);
        self.joins.extend(other.joins);
        self
    }

    /// Drop every condition, keeping tables and joins.
    pub fn clear_conditions(&mut self) -> &mut Self {
        self.conditions.clear();
        self
    }

    /// Build a SELECT over these parts.
    ///
    /// Joined tables appear in the order they were added, so a join may
    /// reference any table added before it. A table without a registered
    /// join is cross-joined.
    pub fn to_query(&self, select: Vec<SelectExpr>) -> Query {
        let mut tables = self.tables.iter();
        let mut query = Query::new().select(select);

        if let Some(base) = tables.next() {
            query = query.from(TableRef::new(base));
        }

        for table in tables {
            let join = self
                .joins
                .get(table)
                .cloned()
                .unwrap_or_else(|| JoinCondition::inner(always_true()));
            query = query.join(join.join_type, TableRef::new(table), join.on);
        }

        if let Some(condition) = all_of(self.conditions.clone()) {
            query = query.filter(condition);
        }

        query
    }
}

/// Compose the row set `filter` is evaluated over: its base table, narrowed by
/// the full-text term and by every applied filter in `ctx`.
pub fn compose(filter: &Filter, ctx: &FacetContext<'_>) -> QueryParts {
    let base_table = filter.table_name.as_str();
    let mut parts = QueryParts::new(base_table);

    if let Some(term) = ctx.search_term() {
        parts.merge(ctx.search_provider().query_parts(
            term,
            base_table,
            filter.searchable_pages,
            filter.searchable_files,
        ));
    }

    for applied in ctx.applied() {
        parts.add_condition(applied.check_condition());

        let applied_name = applied.filter.name.as_str();
        let descriptor = &applied.filter.descriptor;
        let mut field_table = base_table.to_string();
        let mut column = applied_name.to_string();

        if descriptor.is_list {
            field_table = schema::list_table(base_table, applied_name);
            parts.add_table(&field_table);
            parts.set_join(&field_table, main_to_field_join(base_table, &field_table));
            column = VALUE_COLUMN.to_string();
        }

        if descriptor.is_hierarchy {
            let hierarchy_table = schema::hierarchy_table(base_table, applied_name);
            parts.add_table(&hierarchy_table);
            parts.set_join(
                &hierarchy_table,
                field_to_hierarchy_join(&field_table, &column, &hierarchy_table),
            );
        }
    }

    parts
}
