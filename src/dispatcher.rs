//! # Operation Dispatcher
//!
//! Applies an [`OperationList`] to a [`QueryBuilder`] for one execution path.
//! Every path is a left fold in list order; the paths differ only in which
//! [`OperationKind`](crate::operation::OperationKind)s they skip.

use crate::operation::{Operation, OperationList};
use crate::query_builder::QueryBuilder;
use tracing::trace;

fn fold_where<P>(operations: &OperationList, builder: QueryBuilder, path: &str, keep: P) -> QueryBuilder
where
    P: Fn(&Operation) -> bool,
{
    operations.iter().fold(builder, |builder, operation| {
        if keep(operation) {
            trace!(path, operation = operation.description(), "applying operation");
            operation.apply(builder)
        } else {
            builder
        }
    })
}

/// Count path: skips update-columns, pagination, select, ordering and
/// grouping
pub fn apply_for_count(operations: &OperationList, builder: QueryBuilder) -> QueryBuilder {
    fold_where(operations, builder, "count", |operation| {
        operation.kind().applies_to_count()
    })
}

/// Data path: skips update-columns and count-select
pub fn apply_for_query(operations: &OperationList, builder: QueryBuilder) -> QueryBuilder {
    fold_where(operations, builder, "query", |operation| {
        operation.kind().applies_to_query()
    })
}

/// Write path: applies everything, including update-columns, upsert and
/// ignore operations
pub fn apply_for_write(operations: &OperationList, builder: QueryBuilder) -> QueryBuilder {
    fold_where(operations, builder, "write", |_| true)
}
