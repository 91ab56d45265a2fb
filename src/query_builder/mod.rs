//! # Query Builder
//!
//! The query handle that compiled operations transform, and the rendering of
//! that handle into parameterized statements.
//!
//! ## Key Components
//!
//! - [`builder`] - [`QueryBuilder`], the handle, and statement rendering
//! - [`conditions`] - WHERE/HAVING predicates, always bound as parameters
//! - [`joins`] - JOIN clause management (INNER, LEFT, RIGHT, CROSS)
//! - [`pagination`] - LIMIT/OFFSET from page and page size
//! - [`sql_string`] - placeholder-aware SQL accumulator and [`Statement`]
//! - [`dialect`] - Postgres and MySQL placeholder/quoting/conflict syntax
//!
//! ## Example Usage
//!
//! ```rust
//! use query_conditions::query_builder::{
//!     ComparisonOperator, Condition, Dialect, Pagination, QueryBuilder,
//! };
//! use serde_json::json;
//!
//! let statement = QueryBuilder::new(Dialect::Postgres)
//!     .table("users")
//!     .where_clause(Condition::compare("age", ComparisonOperator::GreaterThanOrEqual, json!(18)))
//!     .paginate(Pagination::from_page(2, 5))
//!     .build_select()
//!     .unwrap();
//!
//! assert_eq!(statement.sql, "SELECT * FROM \"users\" WHERE age >= $1 LIMIT 5 OFFSET 5");
//! ```

pub mod builder;
pub mod conditions;
pub mod dialect;
pub mod joins;
pub mod pagination;
pub mod sql_string;

pub use builder::{ConflictAction, QueryBuilder};
pub use conditions::{ComparisonOperator, Condition, LogicalOperator, WhereClause};
pub use dialect::Dialect;
pub use joins::{Join, JoinType};
pub use pagination::Pagination;
pub use sql_string::{SqlString, Statement};
