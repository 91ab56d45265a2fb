//! sqlx/Postgres [`Session`] implementation.

use super::{Row, Session};
use crate::config::DatabaseConfig;
use crate::error::{QueryError, Result};
use crate::query_builder::{Dialect, Statement};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row as _, Transaction};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Session over a Postgres pool. While a transaction is open every
/// statement runs on the transaction's connection.
pub struct PgSession {
    pool: PgPool,
    transaction: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgSession {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.dialect != Dialect::Postgres {
            return Err(QueryError::configuration(format!(
                "PgSession cannot serve the {} dialect",
                config.dialect
            )));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| QueryError::from_sqlx("connect", &e))?;

        info!(
            "Database pool initialized: {} max connections",
            config.max_connections
        );

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            transaction: Mutex::new(None),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| QueryError::from_sqlx("health_check", &e))?;

        let health: i32 = row
            .try_get("health")
            .map_err(|e| QueryError::from_sqlx("health_check", &e))?;
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    async fn fetch_rows(&self, operation: &str, sql: &str, params: &[Value]) -> Result<Vec<PgRow>> {
        let query = bind_params(sqlx::query(sql), params);
        let mut transaction = self.transaction.lock().await;

        let result = match transaction.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await,
            None => query.fetch_all(&self.pool).await,
        };

        result.map_err(|e| QueryError::from_sqlx(operation, &e))
    }

    async fn fetch_json_rows(&self, operation: &str, statement: &Statement) -> Result<Vec<Row>> {
        let wrapped = format!("SELECT to_jsonb(q) FROM ({}) AS q", statement.sql);
        let rows = self.fetch_rows(operation, &wrapped, &statement.params).await?;

        rows.iter()
            .map(|row| {
                let value: Value = row
                    .try_get(0)
                    .map_err(|e| QueryError::from_sqlx(operation, &e))?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(QueryError::serialization(format!(
                        "expected a JSON object row, got {other}"
                    ))),
                }
            })
            .collect()
    }
}

/// Bind JSON values by their JSON type; arrays and objects bind as `jsonb`
fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(flag) => query.bind(*flag),
            Value::Number(number) => match (number.as_i64(), number.as_f64()) {
                (Some(integer), _) => query.bind(integer),
                (None, Some(float)) => query.bind(float),
                (None, None) => query.bind(number.to_string()),
            },
            Value::String(text) => query.bind(text.clone()),
            Value::Array(_) | Value::Object(_) => query.bind(param.clone()),
        };
    }
    query
}

#[async_trait]
impl Session for PgSession {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
        self.fetch_json_rows("fetch_all", statement).await
    }

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<Row>> {
        let rows = self.fetch_json_rows("fetch_optional", statement).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_count(&self, statement: &Statement) -> Result<i64> {
        let rows = self
            .fetch_rows("fetch_count", &statement.sql, &statement.params)
            .await?;

        match rows.first() {
            Some(row) => row
                .try_get::<i64, _>(0)
                .map_err(|e| QueryError::from_sqlx("fetch_count", &e)),
            None => Ok(0),
        }
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let query = bind_params(sqlx::query(&statement.sql), &statement.params);
        let mut transaction = self.transaction.lock().await;

        let result = match transaction.as_mut() {
            Some(tx) => query.execute(&mut **tx).await,
            None => query.execute(&self.pool).await,
        };

        result
            .map(|done| done.rows_affected())
            .map_err(|e| QueryError::from_sqlx("execute", &e))
    }

    async fn begin(&self) -> Result<()> {
        let mut transaction = self.transaction.lock().await;
        if transaction.is_some() {
            return Err(QueryError::transaction("begin", "a transaction is already open"));
        }

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| QueryError::transaction("begin", e.to_string()))?;
        *transaction = Some(tx);
        debug!("transaction opened");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let tx = self
            .transaction
            .lock()
            .await
            .take()
            .ok_or_else(|| QueryError::transaction("commit", "no open transaction"))?;

        tx.commit()
            .await
            .map_err(|e| QueryError::transaction("commit", e.to_string()))?;
        debug!("transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let tx = self
            .transaction
            .lock()
            .await
            .take()
            .ok_or_else(|| QueryError::transaction("rollback", "no open transaction"))?;

        tx.rollback()
            .await
            .map_err(|e| QueryError::transaction("rollback", e.to_string()))?;
        debug!("transaction rolled back");
        Ok(())
    }
}
