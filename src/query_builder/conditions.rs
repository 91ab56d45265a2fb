use super::{Dialect, SqlString};
use serde_json::Value;

/// Binary comparison operators with a single bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
}

impl ComparisonOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::Like => "LIKE",
        }
    }
}

/// Represents different types of SQL conditions. Field names are written as
/// given; every value is bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        field: String,
        operator: ComparisonOperator,
        value: Value,
        /// Postgres type the bound value is cast to
        cast: Option<String>,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
    NotIn {
        field: String,
        values: Vec<Value>,
    },
    Between {
        field: String,
        start: Value,
        end: Value,
    },
    /// Disjunction of `LIKE` predicates sharing one pattern
    LikeAny {
        fields: Vec<String>,
        pattern: String,
    },
    /// Natural-language full-text match over one or more columns
    FullText {
        fields: Vec<String>,
        query: Value,
    },
    JsonContains {
        field: String,
        value: Value,
    },
    /// Verbatim predicate using `?` placeholders
    Raw {
        sql: String,
        params: Vec<Value>,
    },
}

impl Condition {
    pub fn compare(field: impl Into<String>, operator: ComparisonOperator, value: Value) -> Self {
        Condition::Compare {
            field: field.into(),
            operator,
            value,
            cast: None,
        }
    }

    /// Comparison whose bound value is cast on Postgres, for columns that do
    /// not accept text (timestamps, uuids, enums)
    pub fn compare_cast(
        field: impl Into<String>,
        operator: ComparisonOperator,
        value: Value,
        cast: impl Into<String>,
    ) -> Self {
        Condition::Compare {
            field: field.into(),
            operator,
            value,
            cast: Some(cast.into()),
        }
    }

    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Condition::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// Wrap a substring in `%` wildcards for a contains-style `LIKE`
    pub fn contains_pattern(substring: &str) -> String {
        format!("%{substring}%")
    }

    /// Render into `sql`, binding values
    pub fn to_sql(&self, sql: &mut SqlString) {
        match self {
            Condition::Compare {
                field,
                operator,
                value,
                cast,
            } => {
                sql.append_syntax(&format!("{field} {} ", operator.to_sql()));
                sql.append_typed_param(value.clone(), cast.as_deref());
            }
            Condition::In { field, values } => {
                if values.is_empty() {
                    // an empty membership test matches nothing
                    sql.append_syntax("1 = 0");
                } else {
                    sql.append_syntax(&format!("{field} IN ("));
                    sql.append_param_list(values);
                    sql.append_syntax(")");
                }
            }
            Condition::NotIn { field, values } => {
                if values.is_empty() {
                    sql.append_syntax("1 = 1");
                } else {
                    sql.append_syntax(&format!("{field} NOT IN ("));
                    sql.append_param_list(values);
                    sql.append_syntax(")");
                }
            }
            Condition::Between { field, start, end } => {
                sql.append_syntax(&format!("{field} BETWEEN "));
                sql.append_param(start.clone());
                sql.append_syntax(" AND ");
                sql.append_param(end.clone());
            }
            Condition::LikeAny { fields, pattern } => {
                sql.append_syntax("(");
                for (index, field) in fields.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(" OR ");
                    }
                    sql.append_syntax(&format!("{field} LIKE "));
                    sql.append_param(Value::String(pattern.clone()));
                }
                sql.append_syntax(")");
            }
            Condition::FullText { fields, query } => match sql.dialect() {
                Dialect::MySql => {
                    sql.append_syntax(&format!("MATCH({}) AGAINST(", fields.join(", ")));
                    sql.append_param(query.clone());
                    sql.append_syntax(" IN NATURAL LANGUAGE MODE)");
                }
                Dialect::Postgres => {
                    sql.append_syntax(&format!(
                        "to_tsvector(concat_ws(' ', {})) @@ plainto_tsquery(",
                        fields.join(", ")
                    ));
                    sql.append_param(query.clone());
                    sql.append_syntax(")");
                }
            },
            Condition::JsonContains { field, value } => match sql.dialect() {
                Dialect::MySql => {
                    sql.append_syntax(&format!("JSON_CONTAINS({field}, "));
                    sql.append_param(value.clone());
                    sql.append_syntax(")");
                }
                Dialect::Postgres => {
                    sql.append_syntax(&format!("{field} @> "));
                    sql.append_param(value.clone());
                    sql.append_syntax("::jsonb");
                }
            },
            Condition::Raw { sql: raw, params } => {
                sql.append_syntax("(");
                sql.append_raw(raw, params);
                sql.append_syntax(")");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        }
    }
}

/// A WHERE (or HAVING) entry: a condition and the connective joining it to
/// the entries before it
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: Condition,
    pub connective: LogicalOperator,
}

impl WhereClause {
    pub fn and(condition: Condition) -> Self {
        Self {
            condition,
            connective: LogicalOperator::And,
        }
    }

    pub fn or(condition: Condition) -> Self {
        Self {
            condition,
            connective: LogicalOperator::Or,
        }
    }

    /// Render a clause list; the first entry's connective is ignored
    pub fn list_to_sql(clauses: &[WhereClause], sql: &mut SqlString) {
        for (index, clause) in clauses.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(clause.connective.to_sql());
            }
            clause.condition.to_sql(sql);
        }
    }
}
