//! # Constants
//!
//! Tag vocabulary and defaults shared by the tag parser, the condition compiler
//! and the data access layer.

/// Reserved field names intercepted by the compiler before operator dispatch
pub mod reserved {
    /// Field is never compiled
    pub const SKIP: &str = "-";
    pub const SORT_BY: &str = "sort_by";
    pub const GROUP_BY: &str = "group_by";
    pub const NO_COUNT: &str = "no_count";
    pub const PAGE: &str = "page";
    pub const PAGE_SIZE: &str = "page_size";
    pub const SELECT: &str = "select";

    /// All reserved names, in the order the compiler checks them
    pub const ALL: &[&str] = &[SORT_BY, GROUP_BY, NO_COUNT, PAGE, PAGE_SIZE, SELECT];
}

/// Operator names accepted by `op:<name>`
pub mod operators {
    pub const EQUAL: &str = "equal";
    pub const NOT_EQUAL: &str = "not_equal";
    pub const LIKE: &str = "like";
    pub const LIKE_OR: &str = "like_or";
    pub const IN: &str = "in";
    pub const NOT_IN: &str = "not_in";
    pub const LT: &str = "lt";
    pub const LTE: &str = "lte";
    pub const GT: &str = "gt";
    pub const GTE: &str = "gte";
    pub const JSON_CONTAINS: &str = "json_contains";
    pub const MATCH: &str = "match";
}

/// Tag modifiers following the field name
pub mod modifiers {
    pub const EMPTY: &str = "empty";
    pub const NO_UPDATE: &str = "no-update";
    pub const IGNORE_COPY: &str = "ignore-copy";
    pub const DEFAULT_PREFIX: &str = "default:";
    pub const OP_PREFIX: &str = "op:";
    pub const CAST_PREFIX: &str = "cast:";
}

/// Separator between column names in `like_or` and `match` tags
pub const FIELD_LIST_SEPARATOR: char = '&';

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CONNECTION: &str = "default";
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// MySQL duplicate-key message prefix, kept as a fallback for drivers that do
/// not expose a structured error kind
pub const MYSQL_DUPLICATE_ENTRY: &str = "Error 1062: Duplicate entry";
pub const POSTGRES_DUPLICATE_KEY: &str = "duplicate key value violates unique constraint";
