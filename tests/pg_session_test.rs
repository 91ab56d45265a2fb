//! Round trip through a live Postgres. Skipped unless DATABASE_URL is set.

use query_conditions::test_utils::test_database_url;
use query_conditions::{
    tagged_record, Dao, DatabaseConfig, Model, OperationList, PgSession, QueryScopes,
    SessionContext,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Sample {
    id: i64,
    label: String,
    weight: i64,
}

impl Model for Sample {
    fn table_name() -> &'static str {
        "query_conditions_sample"
    }
}

#[derive(Debug, Default)]
struct SampleSearch {
    min_weight: i64,
    page: i64,
    page_size: i64,
}

tagged_record!(SampleSearch {
    min_weight => "weight,op:gte",
    page => "page",
    page_size => "page_size",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Contact {
    id: i64,
    name: String,
    referrer_id: Option<i64>,
}

impl Model for Contact {
    fn table_name() -> &'static str {
        "query_conditions_contact"
    }
}

#[derive(Debug, Default)]
struct ContactSearch {
    created_before: String,
}

tagged_record!(ContactSearch {
    created_before => "created_at,op:lt,cast:timestamptz",
});

async fn connect(url: String) -> PgSession {
    let config = DatabaseConfig {
        url,
        max_connections: 2,
        ..DatabaseConfig::default()
    };
    PgSession::connect(&config).await.unwrap()
}

#[tokio::test]
async fn test_pg_session_round_trip() {
    let Some(url) = test_database_url() else {
        return;
    };

    let session = connect(url).await;
    assert!(session.health_check().await.unwrap());

    sqlx::query("DROP TABLE IF EXISTS query_conditions_sample")
        .execute(session.pool())
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE query_conditions_sample (id BIGSERIAL PRIMARY KEY, label TEXT NOT NULL, weight BIGINT NOT NULL)",
    )
    .execute(session.pool())
    .await
    .unwrap();

    let pool = session.pool().clone();
    let ctx = SessionContext::with_session(Arc::new(session));
    let dao = Dao::default();

    let samples: Vec<Sample> = (1..=7)
        .map(|weight| Sample {
            id: 0,
            label: format!("sample-{weight}"),
            weight,
        })
        .collect();
    let inserted = dao
        .insert_batch(&ctx, &samples, &OperationList::new())
        .await
        .unwrap();
    assert_eq!(inserted, 7);

    let search = SampleSearch {
        min_weight: 3,
        page: 2,
        page_size: 2,
    };
    let operations = dao
        .compile(&search)
        .unwrap()
        .with(QueryScopes::sort("weight"));
    let (total, page) = dao.select_by_page::<Sample>(&ctx, &operations).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(
        page.iter().map(|sample| sample.weight).collect::<Vec<_>>(),
        vec![5, 6]
    );

    let labels: Vec<String> = dao
        .pluck::<Sample, String>(
            &ctx,
            "label",
            &OperationList::new().with(QueryScopes::lt("weight", 3)).with(QueryScopes::sort("weight")),
        )
        .await
        .unwrap();
    assert_eq!(labels, vec!["sample-1".to_string(), "sample-2".to_string()]);

    sqlx::query("DROP TABLE query_conditions_sample")
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_pg_session_nullable_and_cast_columns() {
    let Some(url) = test_database_url() else {
        return;
    };
    let session = connect(url).await;

    sqlx::query("DROP TABLE IF EXISTS query_conditions_contact")
        .execute(session.pool())
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE query_conditions_contact (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL, \
         referrer_id BIGINT NULL, created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    )
    .execute(session.pool())
    .await
    .unwrap();

    let pool = session.pool().clone();
    let ctx = SessionContext::with_session(Arc::new(session));
    let dao = Dao::default();

    let orphan = Contact {
        id: 0,
        name: "orphan".to_string(),
        referrer_id: None,
    };
    assert_eq!(dao.insert(&ctx, &orphan, &OperationList::new()).await.unwrap(), 1);
    let referred = Contact {
        id: 0,
        name: "referred".to_string(),
        referrer_id: Some(1),
    };
    assert_eq!(dao.save(&ctx, &referred, &OperationList::new()).await.unwrap(), 1);

    let stored: Vec<Contact> = dao
        .select(&ctx, &OperationList::new().with(QueryScopes::sort("id")))
        .await
        .unwrap();
    assert_eq!(
        stored.iter().map(|contact| contact.referrer_id).collect::<Vec<_>>(),
        vec![None, Some(1)]
    );

    let before = |created_before: &str| ContactSearch {
        created_before: created_before.to_string(),
    };
    let future = dao.compile(&before("2999-01-01T00:00:00Z")).unwrap();
    assert_eq!(dao.count::<Contact>(&ctx, &future).await.unwrap(), 2);
    let past = dao.compile(&before("2000-01-01T00:00:00Z")).unwrap();
    assert_eq!(dao.count::<Contact>(&ctx, &past).await.unwrap(), 0);

    sqlx::query("DROP TABLE query_conditions_contact")
        .execute(&pool)
        .await
        .unwrap();
}
