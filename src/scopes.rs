//! # Query Scopes
//!
//! The operation catalog: each constructor returns an [`Operation`] of a
//! fixed [`OperationKind`] performing one transformation of the query handle.
//!
//! ## Design Philosophy
//!
//! - **Bound values**: every value reaches the statement as a parameter,
//!   including the multi-column `LIKE` and full-text paths
//! - **Identifiers as given**: column, table and expression arguments are
//!   written verbatim, so they must never come from untrusted input
//! - **Composability**: scopes are plain values collected in an
//!   [`OperationList`](crate::operation::OperationList) and replayed on the
//!   count and data handles

use crate::database::Model;
use crate::operation::{Operation, OperationKind};
use crate::query_builder::{
    ComparisonOperator, Condition, ConflictAction, Join, JoinType, Pagination, QueryBuilder,
};
use serde_json::Value;

/// Operation catalog
pub struct QueryScopes;

impl QueryScopes {
    pub(crate) fn compare(field: String, operator: ComparisonOperator, value: Value) -> Operation {
        let description = format!("{field} {}", operator.to_sql());
        Operation::new(OperationKind::Other, description, move |builder| {
            builder.where_clause(Condition::compare(field.clone(), operator, value.clone()))
        })
    }

    /// Comparison with the value cast to `cast` on Postgres
    pub fn compare_as(
        field: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<Value>,
        cast: impl Into<String>,
    ) -> Operation {
        let (field, value, cast) = (field.into(), value.into(), cast.into());
        let description = format!("{field} {} ::{cast}", operator.to_sql());
        Operation::new(OperationKind::Other, description, move |builder| {
            builder.where_clause(Condition::compare_cast(
                field.clone(),
                operator,
                value.clone(),
                cast.clone(),
            ))
        })
    }

    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::Equal, value.into())
    }

    pub fn not_equal(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::NotEqual, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::LessThan, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::LessThanOrEqual, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::GreaterThan, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        Self::compare(field.into(), ComparisonOperator::GreaterThanOrEqual, value.into())
    }

    /// `field IN (...)`; an empty list matches nothing
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Operation {
        let field = field.into();
        Operation::new(OperationKind::Other, format!("{field} IN"), move |builder| {
            builder.where_clause(Condition::In {
                field: field.clone(),
                values: values.clone(),
            })
        })
    }

    /// `field NOT IN (...)`; an empty list matches everything
    pub fn not_in_list(field: impl Into<String>, values: Vec<Value>) -> Operation {
        let field = field.into();
        Operation::new(OperationKind::Other, format!("{field} NOT IN"), move |builder| {
            builder.where_clause(Condition::NotIn {
                field: field.clone(),
                values: values.clone(),
            })
        })
    }

    pub fn between(
        field: impl Into<String>,
        begin: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Operation {
        let field = field.into();
        let (start, end) = (begin.into(), end.into());
        Operation::new(OperationKind::Other, format!("{field} BETWEEN"), move |builder| {
            builder.where_clause(Condition::Between {
                field: field.clone(),
                start: start.clone(),
                end: end.clone(),
            })
        })
    }

    /// `field LIKE '%substring%'`
    pub fn like(field: impl Into<String>, substring: &str) -> Operation {
        let field = field.into();
        let pattern = Condition::contains_pattern(substring);
        Operation::new(OperationKind::Other, format!("{field} LIKE"), move |builder| {
            builder.where_clause(Condition::compare(
                field.clone(),
                ComparisonOperator::Like,
                Value::String(pattern.clone()),
            ))
        })
    }

    /// `(f1 LIKE '%value%' OR f2 LIKE '%value%' ...)` as one predicate
    pub fn like_or<S: AsRef<str>>(value: &str, fields: &[S]) -> Operation {
        let fields: Vec<String> = fields.iter().map(|f| f.as_ref().to_string()).collect();
        let pattern = Condition::contains_pattern(value);
        let description = format!("{} LIKE ANY", fields.join("|"));
        Operation::new(OperationKind::Other, description, move |builder| {
            builder.where_clause(Condition::LikeAny {
                fields: fields.clone(),
                pattern: pattern.clone(),
            })
        })
    }

    /// Natural-language full-text match against the columns' full-text index
    pub fn full_text<S: AsRef<str>>(fields: &[S], value: impl Into<Value>) -> Operation {
        let fields: Vec<String> = fields.iter().map(|f| f.as_ref().to_string()).collect();
        let query = value.into();
        let description = format!("MATCH({})", fields.join(", "));
        Operation::new(OperationKind::Match, description, move |builder| {
            builder.where_clause(Condition::FullText {
                fields: fields.clone(),
                query: query.clone(),
            })
        })
    }

    pub fn json_contains(field: impl Into<String>, value: impl Into<Value>) -> Operation {
        let field = field.into();
        let value = value.into();
        Operation::new(
            OperationKind::Other,
            format!("{field} JSON CONTAINS"),
            move |builder| {
                builder.where_clause(Condition::JsonContains {
                    field: field.clone(),
                    value: value.clone(),
                })
            },
        )
    }

    /// Verbatim predicate with `?` placeholders, joined with AND
    pub fn raw(condition: impl Into<String>, params: Vec<Value>) -> Operation {
        let condition = condition.into();
        Operation::new(OperationKind::Other, condition.clone(), move |builder| {
            builder.where_clause(Condition::raw(condition.clone(), params.clone()))
        })
    }

    /// Verbatim predicate with `?` placeholders, joined with OR
    pub fn or(condition: impl Into<String>, params: Vec<Value>) -> Operation {
        let condition = condition.into();
        Operation::new(
            OperationKind::Other,
            format!("OR {condition}"),
            move |builder| builder.or_where(Condition::raw(condition.clone(), params.clone())),
        )
    }

    /// Arbitrary transformation, applied on every path that applies filters
    pub fn with<F>(description: impl Into<String>, apply: F) -> Operation
    where
        F: Fn(QueryBuilder) -> QueryBuilder + Send + Sync + 'static,
    {
        Operation::new(OperationKind::Other, description, apply)
    }

    pub fn table(table: impl Into<String>) -> Operation {
        let table = table.into();
        Operation::new(OperationKind::Table, format!("table {table}"), move |builder| {
            builder.table(&table)
        })
    }

    pub fn model<M: Model>() -> Operation {
        Operation::new(
            OperationKind::Table,
            format!("model {}", M::table_name()),
            |builder| builder.model::<M>(),
        )
    }

    pub fn join(join_type: JoinType, table: impl Into<String>, on: impl Into<String>) -> Operation {
        let (table, on) = (table.into(), on.into());
        Operation::new(
            OperationKind::Table,
            format!("{} {table}", join_type.to_sql()),
            move |builder| builder.join(Join::new(join_type, &table, &on)),
        )
    }

    pub fn join_as(
        join_type: JoinType,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) -> Operation {
        let (table, alias, on) = (table.into(), alias.into(), on.into());
        Operation::new(
            OperationKind::Table,
            format!("{} {table} AS {alias}", join_type.to_sql()),
            move |builder| builder.join(Join::new(join_type, &table, &on).with_alias(&alias)),
        )
    }

    /// Column selection for the data query
    pub fn select<S: AsRef<str>>(columns: &[S]) -> Operation {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        Operation::new(
            OperationKind::Select,
            format!("select {}", columns.join(", ")),
            move |builder| builder.select(&columns),
        )
    }

    /// Expression counted by the count query, e.g. `DISTINCT user_id`
    pub fn count_select(expression: impl Into<String>) -> Operation {
        let expression = expression.into();
        Operation::new(
            OperationKind::CountSelect,
            format!("count {expression}"),
            move |builder| builder.count_select(&expression),
        )
    }

    /// Restrict the columns an update writes
    pub fn update_columns<S: AsRef<str>>(columns: &[S]) -> Operation {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        Operation::new(
            OperationKind::UpdateColumns,
            format!("update {}", columns.join(", ")),
            move |builder| builder.update_columns(&columns),
        )
    }

    pub fn sort(expression: impl Into<String>) -> Operation {
        let expression = expression.into();
        Operation::new(
            OperationKind::OrderBy,
            format!("order by {expression}"),
            move |builder| {
                if expression.is_empty() {
                    builder
                } else {
                    builder.order_by(&expression)
                }
            },
        )
    }

    pub fn group_by(expression: impl Into<String>) -> Operation {
        let expression = expression.into();
        Operation::new(
            OperationKind::GroupBy,
            format!("group by {expression}"),
            move |builder| {
                if expression.is_empty() {
                    builder
                } else {
                    builder.group_by(&expression)
                }
            },
        )
    }

    /// HAVING predicate; kept on the count path like any other filter.
    ///
    /// The count path drops grouping, so the count aggregates the whole
    /// filtered set into one row and reports 1 when the predicate holds on it
    /// and 0 otherwise. It is not a count of groups.
    pub fn having(expression: impl Into<String>, params: Vec<Value>) -> Operation {
        let expression = expression.into();
        Operation::new(
            OperationKind::Other,
            format!("having {expression}"),
            move |builder| {
                if expression.is_empty() {
                    builder
                } else {
                    builder.having(Condition::raw(expression.clone(), params.clone()))
                }
            },
        )
    }

    /// Insert-or-update: on a `target` key collision overwrite `update_columns`
    pub fn upsert<S: AsRef<str>>(target: &[S], update_columns: &[S]) -> Operation {
        let target: Vec<String> = target.iter().map(|c| c.as_ref().to_string()).collect();
        let update_columns: Vec<String> =
            update_columns.iter().map(|c| c.as_ref().to_string()).collect();
        Operation::new(
            OperationKind::UpdateColumns,
            format!("on conflict update {}", update_columns.join(", ")),
            move |builder| {
                builder.on_conflict(ConflictAction::Update {
                    target: target.clone(),
                    update_columns: update_columns.clone(),
                })
            },
        )
    }

    /// Skip rows colliding with an existing key on insert
    pub fn ignore_duplicates() -> Operation {
        Operation::new(OperationKind::UpdateColumns, "insert ignore", |builder| {
            builder.insert_ignore()
        })
    }

    /// LIMIT/OFFSET from a 1-based page; see [`Pagination::from_page`]
    pub fn page(page: i64, page_size: i64) -> Operation {
        let pagination = Pagination::from_page(page, page_size);
        Operation::new(
            OperationKind::Pagination,
            format!("page {page} size {page_size}"),
            move |builder| {
                if pagination.is_unbounded() {
                    builder
                } else {
                    builder.paginate(pagination)
                }
            },
        )
    }

    /// Marker telling the paging façade to skip the count query
    pub fn no_count() -> Operation {
        Operation::new(OperationKind::NoCount, "no count", |builder| builder)
    }
}
