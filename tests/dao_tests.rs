mod common;

use common::{mock_context, Contact, User, UserSearch};
use query_conditions::test_utils::SessionEvent;
use query_conditions::{
    Dao, Dialect, OperationList, QueryConfig, QueryError, QueryScopes, SessionContext,
    StorageErrorKind,
};
use serde_json::json;

fn user_row(id: i64, name: &str) -> serde_json::Value {
    json!({"id": id, "name": name, "age": 30, "status": 1})
}

#[tokio::test]
async fn test_get_found_and_not_found() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    session.push_rows(vec![user_row(3, "ann")]);
    let dao = Dao::default();
    let operations = OperationList::new().with(QueryScopes::equal("id", 3));

    let user = dao.get::<User>(&ctx, &operations).await.unwrap();
    assert_eq!(user.map(|user| user.name), Some("ann".to_string()));

    let missing = dao.get::<User>(&ctx, &operations).await.unwrap();
    assert!(missing.is_none());

    assert_eq!(
        session.sql()[0],
        "SELECT * FROM \"users\" WHERE id = $1 LIMIT 1"
    );
}

#[tokio::test]
async fn test_select_by_page_counts_then_fetches() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    session.push_count(12);
    session.push_rows(vec![user_row(6, "fay"), user_row(7, "gus")]);

    let dao = Dao::default();
    let search = UserSearch {
        age: 18,
        page: 2,
        page_size: 5,
        ..UserSearch::default()
    };
    let operations = dao.compile(&search).unwrap();
    let (total, users) = dao.select_by_page::<User>(&ctx, &operations).await.unwrap();

    assert_eq!(total, 12);
    assert_eq!(users.len(), 2);
    assert_eq!(
        session.events(),
        vec![SessionEvent::FetchCount, SessionEvent::FetchAll]
    );
    assert_eq!(
        session.sql(),
        vec![
            "SELECT COUNT(*) FROM \"users\" WHERE age >= $1".to_string(),
            "SELECT * FROM \"users\" WHERE age >= $1 LIMIT 5 OFFSET 5".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_select_by_page_skips_count_when_disabled() {
    let (session, ctx) = mock_context(Dialect::MySql);
    let dao = Dao::default();
    let search = UserSearch {
        age: 18,
        no_count: true,
        ..UserSearch::default()
    };
    let operations = dao.compile(&search).unwrap();
    let (total, users) = dao.select_by_page::<User>(&ctx, &operations).await.unwrap();

    assert_eq!(total, 0);
    assert!(users.is_empty());
    assert_eq!(session.events(), vec![SessionEvent::FetchAll]);
    assert_eq!(session.sql(), vec!["SELECT * FROM `users` WHERE age >= ?".to_string()]);
}

#[tokio::test]
async fn test_count_uses_count_path() {
    let (session, ctx) = mock_context(Dialect::MySql);
    session.push_count(4);
    let operations = OperationList::new()
        .with(QueryScopes::gt("age", 60))
        .with(QueryScopes::sort("age"))
        .with(QueryScopes::page(3, 10));

    let total = Dao::default().count::<User>(&ctx, &operations).await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(session.sql(), vec!["SELECT COUNT(*) FROM `users` WHERE age > ?".to_string()]);
}

#[tokio::test]
async fn test_update_writes_non_zero_fields_by_primary_key() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    session.push_affected(1);
    let user = User {
        id: 9,
        name: "ivy".to_string(),
        age: 0,
        status: 2,
    };

    let affected = Dao::default()
        .update(&ctx, &user, &OperationList::new())
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let statement = &session.statements()[0];
    assert_eq!(
        statement.sql,
        "UPDATE \"users\" SET \"name\" = $1, \"status\" = $2 WHERE id = $3"
    );
    assert_eq!(statement.params, vec![json!("ivy"), json!(2), json!(9)]);
}

#[tokio::test]
async fn test_update_columns_are_exact() {
    let (session, ctx) = mock_context(Dialect::MySql);
    let user = User {
        id: 0,
        name: "ivy".to_string(),
        age: 0,
        status: 2,
    };
    let operations = OperationList::new()
        .with(QueryScopes::equal("name", "ivy"))
        .with(QueryScopes::update_columns(&["age", "status"]));

    Dao::default().update(&ctx, &user, &operations).await.unwrap();
    let statement = &session.statements()[0];
    assert_eq!(
        statement.sql,
        "UPDATE `users` SET `age` = ?, `status` = ? WHERE name = ?"
    );
    assert_eq!(statement.params, vec![json!(0), json!(2), json!("ivy")]);
}

#[tokio::test]
async fn test_update_rejects_unknown_column() {
    let (_, ctx) = mock_context(Dialect::MySql);
    let operations = OperationList::new()
        .with(QueryScopes::equal("id", 1))
        .with(QueryScopes::update_columns(&["nickname"]));

    let err = Dao::default()
        .update(&ctx, &User::new(1, "a", 3), &operations)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidField { ref field, .. } if field == "nickname"));
}

#[tokio::test]
async fn test_update_with_nothing_to_write_is_a_noop() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    let user = User {
        id: 5,
        ..User::default()
    };
    let affected = Dao::default()
        .update(&ctx, &user, &OperationList::new())
        .await
        .unwrap();
    assert_eq!(affected, 0);
    assert!(session.statements().is_empty());
}

#[tokio::test]
async fn test_unconstrained_writes_are_refused() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    let dao = Dao::default();
    let user = User {
        id: 0,
        name: "everyone".to_string(),
        ..User::default()
    };

    let err = dao.update(&ctx, &user, &OperationList::new()).await.unwrap_err();
    assert_eq!(err, QueryError::missing_where_clause("update", "users"));

    let err = dao.delete(&ctx, &user, &OperationList::new()).await.unwrap_err();
    assert_eq!(err, QueryError::missing_where_clause("delete", "users"));
    assert!(session.statements().is_empty());
}

#[tokio::test]
async fn test_delete_by_primary_key_and_filters() {
    let (session, ctx) = mock_context(Dialect::MySql);
    session.push_affected(1);
    let operations = OperationList::new().with(QueryScopes::lt("age", 18));

    let affected = Dao::default()
        .delete(&ctx, &User::new(4, "dan", 12), &operations)
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(
        session.sql(),
        vec!["DELETE FROM `users` WHERE age < ? AND id = ?".to_string()]
    );
}

#[tokio::test]
async fn test_insert_omits_zero_primary_key() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    Dao::default()
        .insert(&ctx, &User::new(0, "eve", 22), &OperationList::new())
        .await
        .unwrap();
    assert_eq!(
        session.sql(),
        vec![
            "INSERT INTO \"users\" (\"name\", \"age\", \"status\") VALUES ($1, $2, $3)".to_string()
        ]
    );
}

#[tokio::test]
async fn test_insert_writes_null_without_binding() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    let contact = Contact {
        id: 0,
        name: "ivy".to_string(),
        referrer_id: None,
    };
    Dao::default()
        .insert(&ctx, &contact, &OperationList::new())
        .await
        .unwrap();

    let statement = &session.statements()[0];
    assert_eq!(
        statement.sql,
        "INSERT INTO \"contacts\" (\"name\", \"referrer_id\") VALUES ($1, NULL)"
    );
    assert_eq!(statement.params, vec![json!("ivy")]);
}

#[tokio::test]
async fn test_save_inserts() {
    let (session, ctx) = mock_context(Dialect::MySql);
    let affected = Dao::default()
        .save(&ctx, &User::new(0, "hal", 28), &OperationList::new())
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(
        session.sql(),
        vec!["INSERT INTO `users` (`name`, `age`, `status`) VALUES (?, ?, ?)".to_string()]
    );
}

#[tokio::test]
async fn test_insert_upsert_and_ignore() {
    let (session, ctx) = mock_context(Dialect::MySql);
    let dao = Dao::default();
    let user = User::new(7, "gil", 40);

    let upsert = OperationList::new().with(QueryScopes::upsert(&["id"], &["name", "age"]));
    dao.insert(&ctx, &user, &upsert).await.unwrap();

    let ignore = OperationList::new().with(QueryScopes::ignore_duplicates());
    dao.insert(&ctx, &user, &ignore).await.unwrap();

    assert_eq!(
        session.sql(),
        vec![
            "INSERT INTO `users` (`id`, `name`, `age`, `status`) VALUES (?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE `name` = VALUES(`name`), `age` = VALUES(`age`)"
                .to_string(),
            "INSERT IGNORE INTO `users` (`id`, `name`, `age`, `status`) VALUES (?, ?, ?, ?)"
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_insert_batch_chunks_rows() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    session.push_affected(2);
    session.push_affected(2);
    session.push_affected(1);
    let dao = Dao::new(QueryConfig {
        batch_size: 2,
        ..QueryConfig::default()
    });
    let users: Vec<User> = (1..=5).map(|i| User::new(0, &format!("u{i}"), 20 + i)).collect();

    let affected = dao
        .insert_batch(&ctx, &users, &OperationList::new())
        .await
        .unwrap();
    assert_eq!(affected, 5);

    let statements = session.statements();
    assert_eq!(statements.len(), 3);
    assert_eq!(statements[0].params.len(), 6);
    assert_eq!(statements[2].params.len(), 3);
    assert!(statements[0].sql.ends_with("VALUES ($1, $2, $3), ($4, $5, $6)"));

    let none: Vec<User> = Vec::new();
    assert_eq!(
        dao.insert_batch(&ctx, &none, &OperationList::new()).await.unwrap(),
        0
    );
    assert_eq!(session.statements().len(), 3);
}

#[tokio::test]
async fn test_pluck_column_values() {
    let (session, ctx) = mock_context(Dialect::Postgres);
    session.push_rows(vec![json!({"name": "ann"}), json!({"name": "bob"})]);
    let operations = OperationList::new()
        .with(QueryScopes::gte("age", 18))
        .with(QueryScopes::sort("name"));

    let names: Vec<String> = Dao::default()
        .pluck::<User, String>(&ctx, "name", &operations)
        .await
        .unwrap();
    assert_eq!(names, vec!["ann".to_string(), "bob".to_string()]);
    assert_eq!(
        session.sql(),
        vec!["SELECT name FROM \"users\" WHERE age >= $1 ORDER BY name".to_string()]
    );
}

#[tokio::test]
async fn test_missing_session_is_reported() {
    let ctx = SessionContext::new();
    let err = Dao::default()
        .select::<User>(&ctx, &OperationList::new())
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::SessionMissing { .. }));
}

#[tokio::test]
async fn test_storage_errors_carry_the_verb() {
    let (session, ctx) = mock_context(Dialect::MySql);
    session.push_failure(QueryError::storage_with_kind(
        "execute",
        "Error 1062: Duplicate entry 'gil' for key 'name'",
        StorageErrorKind::Other,
    ));

    let err = Dao::default()
        .insert(&ctx, &User::new(0, "gil", 40), &OperationList::new())
        .await
        .unwrap_err();
    assert!(err.is_record_exists());
    assert!(matches!(
        err,
        QueryError::Storage { ref operation, .. } if operation == "insert: execute"
    ));
}
