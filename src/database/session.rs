use super::Row;
use crate::constants::DEFAULT_CONNECTION;
use crate::error::{QueryError, Result};
use crate::query_builder::{Dialect, Statement};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Executes rendered statements against a store.
///
/// Rows come back as JSON objects keyed by column name. `begin`, `commit`
/// and `rollback` scope every statement executed in between to one
/// transaction.
#[async_trait]
pub trait Session: Send + Sync {
    fn dialect(&self) -> Dialect;

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>>;

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<Row>>;

    /// Run a statement selecting a single integer, e.g. `COUNT(*)`
    async fn fetch_count(&self, statement: &Statement) -> Result<i64>;

    /// Run a write statement, returning the number of rows affected
    async fn execute(&self, statement: &Statement) -> Result<u64>;

    async fn begin(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}

/// Per-request carrier of the session handle and the appointed connection
/// name. A context without a session is valid to build; using it reports
/// [`QueryError::SessionMissing`].
#[derive(Clone)]
pub struct SessionContext {
    session: Option<Arc<dyn Session>>,
    connection: String,
}

impl SessionContext {
    /// A context with no session attached
    pub fn new() -> Self {
        Self {
            session: None,
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }

    pub fn with_session(session: Arc<dyn Session>) -> Self {
        Self {
            session: Some(session),
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }

    /// Appoint a named connection; an empty name keeps the default
    pub fn appoint(mut self, connection: impl Into<String>) -> Self {
        let connection = connection.into();
        if !connection.is_empty() {
            self.connection = connection;
        }
        self
    }

    pub fn session(&self) -> Result<&Arc<dyn Session>> {
        self.session.as_ref().ok_or_else(|| {
            QueryError::session_missing(format!(
                "no session runtime attached for connection `{}`",
                self.connection
            ))
        })
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("connection", &self.connection)
            .field("has_session", &self.has_session())
            .finish()
    }
}
