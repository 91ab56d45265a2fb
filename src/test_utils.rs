//! # Test Utilities
//!
//! An in-memory [`Session`] that records what it is asked to run and answers
//! from scripted results, plus environment helpers for tests that talk to a
//! real database.

use crate::database::{Row, Session};
use crate::error::{QueryError, Result};
use crate::query_builder::{Dialect, Statement};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::env;

/// Calls observed by a [`MockSession`], in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    FetchAll,
    FetchOptional,
    FetchCount,
    Execute,
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Default)]
struct MockState {
    statements: Vec<Statement>,
    events: Vec<SessionEvent>,
    rows: VecDeque<Vec<Row>>,
    counts: VecDeque<i64>,
    affected: VecDeque<u64>,
    statement_failures: VecDeque<QueryError>,
    begin_failure: Option<QueryError>,
    commit_failure: Option<QueryError>,
    rollback_failure: Option<QueryError>,
}

/// Scriptable session. Unscripted reads return no rows and a zero count;
/// unscripted writes report one affected row.
#[derive(Debug)]
pub struct MockSession {
    dialect: Dialect,
    state: Mutex<MockState>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::Postgres)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Queue the rows returned by the next row-fetching call. Non-object
    /// values are ignored.
    pub fn push_rows(&self, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.state.lock().rows.push_back(rows);
    }

    pub fn push_count(&self, count: i64) {
        self.state.lock().counts.push_back(count);
    }

    pub fn push_affected(&self, affected: u64) {
        self.state.lock().affected.push_back(affected);
    }

    /// Fail the next statement (of any kind) with `error`
    pub fn push_failure(&self, error: QueryError) {
        self.state.lock().statement_failures.push_back(error);
    }

    pub fn fail_begin(&self, error: QueryError) {
        self.state.lock().begin_failure = Some(error);
    }

    pub fn fail_commit(&self, error: QueryError) {
        self.state.lock().commit_failure = Some(error);
    }

    pub fn fail_rollback(&self, error: QueryError) {
        self.state.lock().rollback_failure = Some(error);
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state.lock().statements.clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.state
            .lock()
            .statements
            .iter()
            .map(|statement| statement.sql.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.lock().events.clone()
    }

    pub fn event_count(&self, event: SessionEvent) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|observed| **observed == event)
            .count()
    }

    fn record(&self, event: SessionEvent, statement: &Statement) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(event);
        state.statements.push(statement.clone());
        match state.statement_failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_rows(&self) -> Vec<Row> {
        self.state.lock().rows.pop_front().unwrap_or_default()
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Session for MockSession {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>> {
        self.record(SessionEvent::FetchAll, statement)?;
        Ok(self.next_rows())
    }

    async fn fetch_optional(&self, statement: &Statement) -> Result<Option<Row>> {
        self.record(SessionEvent::FetchOptional, statement)?;
        Ok(self.next_rows().into_iter().next())
    }

    async fn fetch_count(&self, statement: &Statement) -> Result<i64> {
        self.record(SessionEvent::FetchCount, statement)?;
        Ok(self.state.lock().counts.pop_front().unwrap_or(0))
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        self.record(SessionEvent::Execute, statement)?;
        Ok(self.state.lock().affected.pop_front().unwrap_or(1))
    }

    async fn begin(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Begin);
        state.begin_failure.take().map_or(Ok(()), Err)
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Commit);
        state.commit_failure.take().map_or(Ok(()), Err)
    }

    async fn rollback(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.events.push(SessionEvent::Rollback);
        state.rollback_failure.take().map_or(Ok(()), Err)
    }
}

/// Database URL for tests that need a live Postgres, if one is configured
pub fn test_database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}
