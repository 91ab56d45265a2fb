mod common;

use common::User;
use query_conditions::dispatcher::{apply_for_count, apply_for_query, apply_for_write};
use query_conditions::query_builder::JoinType;
use query_conditions::{Dialect, OperationList, QueryBuilder, QueryScopes};
use serde_json::json;

/// One operation of every kind, in an arbitrary order
fn every_kind() -> OperationList {
    OperationList::new()
        .with(QueryScopes::page(2, 20))
        .with(QueryScopes::model::<User>())
        .with(QueryScopes::join_as(
            JoinType::Left,
            "teams",
            "t",
            "t.id = users.team_id",
        ))
        .with(QueryScopes::equal("users.status", 1))
        .with(QueryScopes::select(&["users.id", "users.name"]))
        .with(QueryScopes::count_select("DISTINCT users.id"))
        .with(QueryScopes::sort("users.id DESC"))
        .with(QueryScopes::update_columns(&["name"]))
        .with(QueryScopes::full_text(&["users.bio"], "rust"))
        .with(QueryScopes::no_count())
}

#[test]
fn test_count_applies_filters_tables_and_count_select() {
    let statement = apply_for_count(&every_kind(), QueryBuilder::new(Dialect::MySql))
        .build_count()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT COUNT(DISTINCT users.id) FROM `users` LEFT JOIN `teams` AS `t` ON t.id = users.team_id \
         WHERE users.status = ? AND MATCH(users.bio) AGAINST(? IN NATURAL LANGUAGE MODE)"
    );
    assert_eq!(statement.params, vec![json!(1), json!("rust")]);
}

#[test]
fn test_query_applies_selection_order_and_paging() {
    let builder = apply_for_query(&every_kind(), QueryBuilder::new(Dialect::MySql));
    assert!(builder.update_column_list().is_empty());

    let statement = builder.build_select().unwrap();
    assert_eq!(
        statement.sql,
        "SELECT users.id, users.name FROM `users` LEFT JOIN `teams` AS `t` ON t.id = users.team_id \
         WHERE users.status = ? AND MATCH(users.bio) AGAINST(? IN NATURAL LANGUAGE MODE) \
         ORDER BY users.id DESC LIMIT 20 OFFSET 20"
    );
}

#[test]
fn test_write_applies_update_columns() {
    let builder = apply_for_write(&every_kind(), QueryBuilder::new(Dialect::MySql));
    assert_eq!(builder.update_column_list(), ["name".to_string()]);
}

#[test]
fn test_having_counts_through_subquery() {
    let operations = OperationList::new()
        .with(QueryScopes::table("orders"))
        .with(QueryScopes::group_by("customer_id"))
        .with(QueryScopes::having("SUM(total) > ?", vec![json!(100)]));

    let count = apply_for_count(&operations, QueryBuilder::new(Dialect::Postgres))
        .build_count()
        .unwrap();
    assert_eq!(
        count.sql,
        "SELECT COUNT(*) FROM (SELECT 1 FROM \"orders\" HAVING (SUM(total) > $1)) AS counted"
    );

    let query = apply_for_query(&operations, QueryBuilder::new(Dialect::Postgres))
        .build_select()
        .unwrap();
    assert_eq!(
        query.sql,
        "SELECT * FROM \"orders\" GROUP BY customer_id HAVING (SUM(total) > $1)"
    );
}

#[test]
fn test_later_table_operation_wins() {
    let operations = OperationList::new()
        .with(QueryScopes::table("users"))
        .with(QueryScopes::table("archived_users"));
    let statement = apply_for_query(&operations, QueryBuilder::new(Dialect::Postgres))
        .with_default_table("ignored")
        .build_select()
        .unwrap();
    assert_eq!(statement.sql, "SELECT * FROM \"archived_users\"");
}

#[test]
fn test_or_and_raw_keep_list_order() {
    let operations = OperationList::new()
        .with(QueryScopes::raw("deleted_at IS NULL", Vec::new()))
        .with(QueryScopes::equal("owner_id", 7))
        .with(QueryScopes::or("shared = ?", vec![json!(true)]));
    let statement = apply_for_query(&operations, QueryBuilder::new(Dialect::Postgres).table("docs"))
        .build_select()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT * FROM \"docs\" WHERE (deleted_at IS NULL) AND owner_id = $1 OR (shared = $2)"
    );
}

#[test]
fn test_empty_membership_lists() {
    let operations = OperationList::new()
        .with(QueryScopes::in_list("id", Vec::new()))
        .with(QueryScopes::not_in_list("id", Vec::new()));
    let statement = apply_for_query(&operations, QueryBuilder::new(Dialect::MySql).table("t"))
        .build_select()
        .unwrap();
    assert_eq!(statement.sql, "SELECT * FROM `t` WHERE 1 = 0 AND 1 = 1");
}
