#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Query Conditions
//!
//! Declarative query-condition compiler: tagged records in, composable
//! parameterized SQL operations out.
//!
//! ## Overview
//!
//! A search record declares, field by field, how its values constrain a
//! query (`"age,op:gte"`, `"title&body,op:like_or"`, `"page_size"`). The
//! compiler turns a record into an ordered list of operations; the
//! dispatcher replays that list on a fresh query handle for each execution
//! path (count, fetch, write); the data access façade renders the handle and
//! runs it on the session carried by the request context.
//!
//! ## Key Features
//!
//! - **Bound values**: every compiled value reaches the store as a parameter
//! - **One list, many paths**: the same operations drive the count and the
//!   page query, each path skipping what does not concern it
//! - **Dialect aware**: Postgres and MySQL placeholders, quoting and
//!   conflict clauses
//! - **Explicit sessions**: the session travels in a [`SessionContext`];
//!   a missing session is a reportable error
//!
//! ## Module Organization
//!
//! - [`tag`] - Tag parsing
//! - [`operation`] - Operations and operation lists
//! - [`scopes`] - The operation catalog
//! - [`compiler`] - Tagged record compilation
//! - [`dispatcher`] - Per-path application of operations
//! - [`query_builder`] - Query handle and statement rendering
//! - [`database`] - Sessions and the data access façade
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use query_conditions::dispatcher::apply_for_query;
//! use query_conditions::query_builder::{Dialect, QueryBuilder};
//! use query_conditions::{compile, tagged_record};
//!
//! struct ArticleSearch {
//!     keyword: String,
//!     status: i64,
//!     page: i64,
//! }
//!
//! tagged_record!(ArticleSearch {
//!     keyword => "title&body,op:like_or",
//!     status => "status,default:1",
//!     page => "page",
//! });
//!
//! let search = ArticleSearch { keyword: "rust".into(), status: 0, page: 2 };
//! let operations = compile(&search).unwrap();
//!
//! let statement = apply_for_query(&operations, QueryBuilder::new(Dialect::MySql))
//!     .with_default_table("articles")
//!     .build_select()
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql,
//!     "SELECT * FROM `articles` WHERE (title LIKE ? OR body LIKE ?) AND status = ? LIMIT 10 OFFSET 10"
//! );
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod compiler;
pub mod config;
pub mod constants;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod operation;
pub mod query_builder;
pub mod scopes;
pub mod tag;
pub mod test_utils;

pub use compiler::{compile, Compiler, TaggedField, TaggedRecord};
pub use config::{CompilerConfig, DatabaseConfig, QueryConfig};
pub use database::{Dao, Model, PgSession, Row, Session, SessionContext};
pub use error::{QueryError, Result, StorageErrorKind};
pub use operation::{Operation, OperationKind, OperationList};
pub use query_builder::{Dialect, QueryBuilder, Statement};
pub use scopes::QueryScopes;
pub use tag::TagDescriptor;
