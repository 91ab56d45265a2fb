//! # Configuration
//!
//! Settings for the compiler and the data access layer, loaded from
//! optional files layered with environment variables.
//!
//! ## Architecture
//!
//! - **Layered sources**: `query.yaml`, then `query.<env>.yaml` (`.yml`,
//!   `.toml` and `.json` are read too), then `QUERY__*` environment variables
//! - **Defaults everywhere**: every field has a default, so an empty
//!   directory yields a usable configuration
//! - **Explicit Validation**: zero sizes are rejected at load time
//!
//! ## Usage
//!
//! ```rust,no_run
//! use query_conditions::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let batch_size = manager.config().batch_size;
//! let page_size = manager.config().compiler.default_page_size;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE};
use crate::error::{QueryError, Result};
use crate::query_builder::Dialect;
use serde::{Deserialize, Serialize};

pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub database: DatabaseConfig,
    pub compiler: CompilerConfig,
    /// Rows per INSERT statement in batch inserts
    pub batch_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            compiler: CompilerConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(QueryError::configuration("batch_size must be greater than 0"));
        }
        self.database.validate()?;
        self.compiler.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub dialect: Dialect,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/query_conditions_development".to_string(),
            max_connections: 10,
            acquire_timeout_seconds: 30,
            dialect: Dialect::Postgres,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(QueryError::configuration(
                "database.max_connections must be greater than 0",
            ));
        }
        if self.url.is_empty() {
            return Err(QueryError::configuration("database.url must not be empty"));
        }
        Ok(())
    }
}

/// Compiler behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Page size used when a record leaves it unset or non-positive
    pub default_page_size: i64,
    /// When set, disabling the count also drops the pagination operation
    pub pagination_requires_count: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            pagination_requires_count: true,
        }
    }
}

impl CompilerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size <= 0 {
            return Err(QueryError::configuration(
                "compiler.default_page_size must be greater than 0",
            ));
        }
        Ok(())
    }
}
