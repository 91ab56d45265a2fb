//! # Operations
//!
//! An [`Operation`] is one composable transformation of a [`QueryBuilder`],
//! tagged with an [`OperationKind`] that decides which execution paths apply
//! it. An [`OperationList`] keeps operations in compile order.

use crate::query_builder::QueryBuilder;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Filters and other predicates
    Other,
    Pagination,
    CountSelect,
    Select,
    GroupBy,
    OrderBy,
    /// Write-path only: update column restriction, upsert, insert-ignore
    UpdateColumns,
    /// Table, model and join targets
    Table,
    NoCount,
    Match,
}

impl OperationKind {
    /// Whether the count query applies operations of this kind
    pub fn applies_to_count(&self) -> bool {
        !matches!(
            self,
            OperationKind::UpdateColumns
                | OperationKind::Pagination
                | OperationKind::Select
                | OperationKind::OrderBy
                | OperationKind::GroupBy
        )
    }

    /// Whether the data query applies operations of this kind
    pub fn applies_to_query(&self) -> bool {
        !matches!(
            self,
            OperationKind::UpdateColumns | OperationKind::CountSelect
        )
    }
}

type ApplyFn = dyn Fn(QueryBuilder) -> QueryBuilder + Send + Sync;

/// A named, typed transformation of a query handle. Cloning shares the
/// underlying function, so one operation can be applied to the count handle
/// and to the data handle.
#[derive(Clone)]
pub struct Operation {
    kind: OperationKind,
    description: String,
    apply: Arc<ApplyFn>,
}

impl Operation {
    pub fn new<F>(kind: OperationKind, description: impl Into<String>, apply: F) -> Self
    where
        F: Fn(QueryBuilder) -> QueryBuilder + Send + Sync + 'static,
    {
        Self {
            kind,
            description: description.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn apply(&self, builder: QueryBuilder) -> QueryBuilder {
        (self.apply)(builder)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish()
    }
}

/// Ordered operations produced by one compile call
#[derive(Debug, Clone, Default)]
pub struct OperationList(Vec<Operation>);

impl OperationList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, operation: Operation) {
        self.0.push(operation);
    }

    /// Append an operation, builder style
    pub fn with(mut self, operation: Operation) -> Self {
        self.0.push(operation);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    pub fn contains_kind(&self, kind: OperationKind) -> bool {
        self.0.iter().any(|operation| operation.kind == kind)
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.0.iter().map(Operation::kind).collect()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.0.iter().map(Operation::description).collect()
    }
}

impl From<Vec<Operation>> for OperationList {
    fn from(operations: Vec<Operation>) -> Self {
        Self(operations)
    }
}

impl FromIterator<Operation> for OperationList {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Operation> for OperationList {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a OperationList {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for OperationList {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
