use proptest::prelude::*;
use query_conditions::query_builder::JoinType;
use query_conditions::{Operation, QueryScopes};
use serde_json::{json, Value};

/// Column names that are never reserved keywords
pub fn column_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["age", "name", "status", "score", "created_at"])
}

/// Tags using each compiled operator on a plain column
pub fn scalar_tag_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "age",
        "age,op:not_equal",
        "age,op:lt",
        "age,op:lte",
        "age,op:gt",
        "age,op:gte",
        "name,op:like",
        "name&email,op:like_or",
        "meta,op:json_contains",
        "title&body,op:match",
        "created,op:created_at > ?",
    ])
}

/// Zero values of every JSON scalar type, plus empty collections
pub fn zero_value_strategy() -> impl Strategy<Value = Value> {
    prop::sample::select(vec![
        json!(0),
        json!(0.0),
        json!(""),
        json!(false),
        Value::Null,
        json!([]),
        json!({}),
    ])
}

/// Non-zero scalar values
pub fn non_zero_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (1i64..10_000).prop_map(Value::from),
        "[a-z]{1,12}".prop_map(Value::from),
        Just(json!(true)),
    ]
}

/// One operation of any kind
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (column_strategy(), 1i64..100).prop_map(|(column, value)| QueryScopes::gte(column, value)),
        column_strategy().prop_map(|column| QueryScopes::like(column, "x")),
        column_strategy().prop_map(|column| QueryScopes::select(&[column])),
        column_strategy().prop_map(|column| QueryScopes::count_select(column)),
        column_strategy().prop_map(|column| QueryScopes::sort(column)),
        column_strategy().prop_map(|column| QueryScopes::group_by(column)),
        column_strategy().prop_map(|column| QueryScopes::update_columns(&[column])),
        (-3i64..20, -3i64..50).prop_map(|(page, size)| QueryScopes::page(page, size)),
        Just(QueryScopes::no_count()),
        Just(QueryScopes::join(JoinType::Left, "teams", "teams.id = users.team_id")),
        Just(QueryScopes::full_text(&["bio"], "rust")),
    ]
}
