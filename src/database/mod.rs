//! # Database Operations
//!
//! Session abstraction and the data access façade over it.
//!
//! ## Key Components
//!
//! - [`session`] - [`Session`] trait and the per-request [`SessionContext`]
//! - [`dao`] - [`Dao`], the verbs run against a session (get, select,
//!   paged select, count, update, insert, batch insert, delete, pluck,
//!   transaction)
//! - [`connection`] - [`PgSession`], the sqlx/Postgres session
//! - [`model`] - [`Model`], table and primary key of a record type
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use query_conditions::config::QueryConfig;
//! use query_conditions::database::{Dao, Model, PgSession, SessionContext};
//! use query_conditions::scopes::QueryScopes;
//! use query_conditions::OperationList;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Model for User {
//!     fn table_name() -> &'static str {
//!         "users"
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QueryConfig::default();
//! let session = PgSession::connect(&config.database).await?;
//! let ctx = SessionContext::with_session(Arc::new(session));
//!
//! let dao = Dao::new(config);
//! let operations = OperationList::new().with(QueryScopes::like("name", "ann"));
//! let (total, users) = dao.select_by_page::<User>(&ctx, &operations).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod dao;
pub mod model;
pub mod session;

pub use connection::PgSession;
pub use dao::{transaction_action, Dao, TransactionAction};
pub use model::Model;
pub use session::{Session, SessionContext};

/// A fetched or to-be-written row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;
