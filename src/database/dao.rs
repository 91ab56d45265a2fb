//! # Access Façade
//!
//! [`Dao`] runs compiled operations against the session carried by a
//! [`SessionContext`]. Each verb builds a fresh [`QueryBuilder`] for the
//! session's dialect, lets the dispatcher apply the relevant operations,
//! falls back to the model's table when no table operation ran, renders one
//! statement and hands it to the session.
//!
//! ```rust
//! use query_conditions::test_utils::MockSession;
//! use query_conditions::{Dao, Dialect, Model, OperationList, QueryScopes, SessionContext};
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct Tag {
//!     name: String,
//! }
//!
//! impl Model for Tag {
//!     fn table_name() -> &'static str {
//!         "tags"
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let session = Arc::new(MockSession::with_dialect(Dialect::MySql));
//! session.push_count(1);
//! let ctx = SessionContext::with_session(session.clone());
//!
//! let operations = OperationList::new().with(QueryScopes::equal("name", "rust"));
//! let total = Dao::default().count::<Tag>(&ctx, &operations).await.unwrap();
//!
//! assert_eq!(total, 1);
//! assert_eq!(session.sql(), vec!["SELECT COUNT(*) FROM `tags` WHERE name = ?".to_string()]);
//! # });
//! ```

use super::{Model, Row, SessionContext};
use crate::compiler::{is_zero, Compiler, TaggedRecord};
use crate::config::QueryConfig;
use crate::dispatcher::{apply_for_count, apply_for_query, apply_for_write};
use crate::error::{QueryError, Result};
use crate::logging::{log_error, log_query_operation};
use crate::operation::{OperationKind, OperationList};
use crate::query_builder::{ComparisonOperator, Condition, QueryBuilder};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

/// One step of [`Dao::transaction`]
pub type TransactionAction<'a> =
    Box<dyn FnOnce(&'a SessionContext) -> BoxFuture<'a, Result<()>> + Send + 'a>;

/// Box an async closure into a [`TransactionAction`]
pub fn transaction_action<'a, F, Fut>(action: F) -> TransactionAction<'a>
where
    F: FnOnce(&'a SessionContext) -> Fut + Send + 'a,
    Fut: Future<Output = Result<()>> + Send + 'a,
{
    Box::new(move |ctx| Box::pin(action(ctx)))
}

/// Data access service
#[derive(Debug, Clone, Default)]
pub struct Dao {
    config: QueryConfig,
}

fn is_unset(value: &Value) -> bool {
    value.is_null() || is_zero(value)
}

fn to_row<T: Serialize>(data: &T) -> Result<Row> {
    match serde_json::to_value(data)? {
        Value::Object(row) => Ok(row),
        other => Err(QueryError::serialization(format!(
            "expected a record serializing to an object, got {other}"
        ))),
    }
}

fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Primary key value when the record carries a non-zero one
fn primary_key_value<T: Model>(row: &Row) -> Option<Value> {
    row.get(T::primary_key()).filter(|value| !is_unset(value)).cloned()
}

fn record_outcome<T>(
    operation: &str,
    table: &str,
    ctx: &SessionContext,
    result: Result<T>,
    rows: impl FnOnce(&T) -> u64,
) -> Result<T> {
    match result {
        Ok(value) => {
            log_query_operation(
                operation,
                Some(table),
                ctx.connection(),
                "success",
                Some(rows(&value)),
                None,
            );
            Ok(value)
        }
        Err(error) => {
            let error = error.with_context(operation);
            log_error("dao", operation, &error.to_string(), Some(table));
            Err(error)
        }
    }
}

impl Dao {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Compile a record with this service's compiler settings
    pub fn compile<R: TaggedRecord + ?Sized>(&self, record: &R) -> Result<OperationList> {
        Compiler::with_config(self.config.compiler.clone()).compile(record)
    }

    fn query_builder<T: Model>(ctx: &SessionContext, operations: &OperationList) -> Result<QueryBuilder> {
        let session = ctx.session()?;
        Ok(apply_for_query(operations, QueryBuilder::new(session.dialect()))
            .with_default_table(T::table_name()))
    }

    fn count_builder<T: Model>(ctx: &SessionContext, operations: &OperationList) -> Result<QueryBuilder> {
        let session = ctx.session()?;
        Ok(apply_for_count(operations, QueryBuilder::new(session.dialect()))
            .with_default_table(T::table_name()))
    }

    /// Write-path builder, constrained by the record's primary key when set
    fn write_builder<T: Model>(
        ctx: &SessionContext,
        operations: &OperationList,
        row: &Row,
    ) -> Result<QueryBuilder> {
        let session = ctx.session()?;
        let builder = apply_for_write(operations, QueryBuilder::new(session.dialect()))
            .with_default_table(T::table_name());

        Ok(match primary_key_value::<T>(row) {
            Some(id) => builder.where_clause(Condition::compare(
                T::primary_key(),
                ComparisonOperator::Equal,
                id,
            )),
            None => builder,
        })
    }

    async fn fetch_rows<T: Model + DeserializeOwned>(
        ctx: &SessionContext,
        operations: &OperationList,
    ) -> Result<Vec<T>> {
        let statement = Self::query_builder::<T>(ctx, operations)?.build_select()?;
        let rows = ctx.session()?.fetch_all(&statement).await?;
        rows.into_iter().map(from_row).collect()
    }

    async fn fetch_count<T: Model>(ctx: &SessionContext, operations: &OperationList) -> Result<i64> {
        let statement = Self::count_builder::<T>(ctx, operations)?.build_count()?;
        ctx.session()?.fetch_count(&statement).await
    }

    /// First matching record; not found is `Ok(None)`
    pub async fn get<T: Model + DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        operations: &OperationList,
    ) -> Result<Option<T>> {
        let result = async {
            let statement = Self::query_builder::<T>(ctx, operations)?
                .limit(1)
                .build_select()?;
            match ctx.session()?.fetch_optional(&statement).await? {
                Some(row) => from_row(row).map(Some),
                None => Ok(None),
            }
        }
        .await;

        record_outcome("get", T::table_name(), ctx, result, |found| {
            u64::from(found.is_some())
        })
    }

    pub async fn select<T: Model + DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        operations: &OperationList,
    ) -> Result<Vec<T>> {
        let result = Self::fetch_rows::<T>(ctx, operations).await;
        record_outcome("select", T::table_name(), ctx, result, |rows| rows.len() as u64)
    }

    /// Total count plus one page of records. The count query is skipped,
    /// and reported as 0, when the operations carry a no-count marker.
    pub async fn select_by_page<T: Model + DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        operations: &OperationList,
    ) -> Result<(i64, Vec<T>)> {
        let result = async {
            let count = if operations.contains_kind(OperationKind::NoCount) {
                debug!(table = T::table_name(), "count disabled for paged select");
                0
            } else {
                Self::fetch_count::<T>(ctx, operations).await?
            };
            let rows = Self::fetch_rows::<T>(ctx, operations).await?;
            Ok::<_, QueryError>((count, rows))
        }
        .await;

        record_outcome("select_by_page", T::table_name(), ctx, result, |(_, rows)| {
            rows.len() as u64
        })
    }

    pub async fn count<T: Model>(
        &self,
        ctx: &SessionContext,
        operations: &OperationList,
    ) -> Result<i64> {
        let result = Self::fetch_count::<T>(ctx, operations).await;
        record_outcome("count", T::table_name(), ctx, result, |count| {
            u64::try_from(*count).unwrap_or(0)
        })
    }

    /// Update matching rows from `data`.
    ///
    /// Writes the non-zero fields of `data`, or exactly the columns of an
    /// update-columns operation when one is present. The primary key is never
    /// written; a non-zero one constrains the update. Returns `Ok(0)` without
    /// touching the store when there is nothing to write.
    pub async fn update<T: Model + Serialize>(
        &self,
        ctx: &SessionContext,
        data: &T,
        operations: &OperationList,
    ) -> Result<u64> {
        let result = async {
            let row = to_row(data)?;
            let builder = Self::write_builder::<T>(ctx, operations, &row)?;
            let primary_key = T::primary_key();

            let assignments: Row = if builder.update_column_list().is_empty() {
                row.iter()
                    .filter(|(column, value)| column.as_str() != primary_key && !is_unset(value))
                    .map(|(column, value)| (column.clone(), value.clone()))
                    .collect()
            } else {
                builder
                    .update_column_list()
                    .iter()
                    .filter(|column| column.as_str() != primary_key)
                    .map(|column| {
                        row.get(column)
                            .map(|value| (column.clone(), value.clone()))
                            .ok_or_else(|| {
                                QueryError::invalid_field(column, "not a field of the record")
                            })
                    })
                    .collect::<Result<Row>>()?
            };

            if assignments.is_empty() {
                debug!(table = T::table_name(), "update has no columns to write");
                return Ok(0);
            }

            let statement = builder.build_update(&assignments)?;
            ctx.session()?.execute(&statement).await
        }
        .await;

        record_outcome("update", T::table_name(), ctx, result, |affected| *affected)
    }

    /// Insert one record. A zero primary key is left to the store.
    pub async fn insert<T: Model + Serialize>(
        &self,
        ctx: &SessionContext,
        data: &T,
        operations: &OperationList,
    ) -> Result<u64> {
        let result = async {
            let rows = vec![Self::insert_row(data)?];
            let session = ctx.session()?;
            let statement = apply_for_write(operations, QueryBuilder::new(session.dialect()))
                .with_default_table(T::table_name())
                .build_insert(&rows)?;
            session.execute(&statement).await
        }
        .await;

        record_outcome("insert", T::table_name(), ctx, result, |affected| *affected)
    }

    /// Alias of [`Dao::insert`]
    pub async fn save<T: Model + Serialize>(
        &self,
        ctx: &SessionContext,
        data: &T,
        operations: &OperationList,
    ) -> Result<u64> {
        self.insert(ctx, data, operations).await
    }

    /// Insert records in chunks of `batch_size` rows per statement
    pub async fn insert_batch<T: Model + Serialize>(
        &self,
        ctx: &SessionContext,
        data: &[T],
        operations: &OperationList,
    ) -> Result<u64> {
        let result = async {
            if data.is_empty() {
                return Ok::<u64, QueryError>(0);
            }

            let rows = data
                .iter()
                .map(Self::insert_row)
                .collect::<Result<Vec<_>>>()?;
            let session = ctx.session()?;
            let builder = apply_for_write(operations, QueryBuilder::new(session.dialect()))
                .with_default_table(T::table_name());

            let mut affected = 0;
            for chunk in rows.chunks(self.config.batch_size.max(1)) {
                let statement = builder.build_insert(chunk)?;
                affected += session.execute(&statement).await?;
            }
            Ok(affected)
        }
        .await;

        record_outcome("insert_batch", T::table_name(), ctx, result, |affected| {
            *affected
        })
    }

    fn insert_row<T: Model + Serialize>(data: &T) -> Result<Row> {
        let mut row = to_row(data)?;
        if row.get(T::primary_key()).is_some_and(is_unset) {
            row.remove(T::primary_key());
        }
        Ok(row)
    }

    /// Delete matching rows; a non-zero primary key of `data` constrains the
    /// delete
    pub async fn delete<T: Model + Serialize>(
        &self,
        ctx: &SessionContext,
        data: &T,
        operations: &OperationList,
    ) -> Result<u64> {
        let result = async {
            let row = to_row(data)?;
            let statement = Self::write_builder::<T>(ctx, operations, &row)?.build_delete()?;
            ctx.session()?.execute(&statement).await
        }
        .await;

        record_outcome("delete", T::table_name(), ctx, result, |affected| *affected)
    }

    /// Values of one column over the matching rows
    pub async fn pluck<T: Model, V: DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        column: &str,
        operations: &OperationList,
    ) -> Result<Vec<V>> {
        let result = async {
            let statement = Self::query_builder::<T>(ctx, operations)?.build_pluck(column)?;
            let rows = ctx.session()?.fetch_all(&statement).await?;

            rows.into_iter()
                .map(|mut row| {
                    let value = match row.remove(column) {
                        Some(value) => value,
                        None if row.len() == 1 => row
                            .into_iter()
                            .next()
                            .map(|(_, value)| value)
                            .unwrap_or(Value::Null),
                        None => {
                            return Err(QueryError::invalid_field(
                                column,
                                "column missing from plucked row",
                            ))
                        }
                    };
                    Ok(serde_json::from_value(value)?)
                })
                .collect::<Result<Vec<V>>>()
        }
        .await;

        record_outcome("pluck", T::table_name(), ctx, result, |values| {
            values.len() as u64
        })
    }

    /// Run `actions` in one transaction.
    ///
    /// The first failing action rolls the transaction back and its error is
    /// returned unchanged; later actions do not run. A failed rollback is
    /// logged and does not replace the action's error.
    pub async fn transaction<'a>(
        &self,
        ctx: &'a SessionContext,
        actions: Vec<TransactionAction<'a>>,
    ) -> Result<()> {
        let session = ctx.session()?;
        let action_count = actions.len();
        session.begin().await?;

        for (index, action) in actions.into_iter().enumerate() {
            if let Err(error) = action(ctx).await {
                if let Err(rollback_error) = session.rollback().await {
                    warn!(
                        error = %rollback_error,
                        action = index,
                        "rollback failed after transaction action error"
                    );
                }
                log_query_operation(
                    "transaction",
                    None,
                    ctx.connection(),
                    "rolled_back",
                    None,
                    Some(&format!("action {} of {action_count} failed", index + 1)),
                );
                return Err(error);
            }
        }

        session.commit().await?;
        log_query_operation(
            "transaction",
            None,
            ctx.connection(),
            "committed",
            Some(action_count as u64),
            None,
        );
        Ok(())
    }
}
