//! # Tag Parser
//!
//! Parses the compact `name,modifier,modifier:value` tag attached to a record
//! field into a [`TagDescriptor`].
//!
//! ```rust
//! use query_conditions::tag::TagDescriptor;
//!
//! let tag = TagDescriptor::parse("status, default:1, op:not_equal");
//! assert_eq!(tag.name, "status");
//! assert_eq!(tag.operator, "not_equal");
//! assert_eq!(tag.default_value.as_deref(), Some("1"));
//! ```

use crate::constants::{modifiers, operators, reserved, FIELD_LIST_SEPARATOR};

/// Parsed query behaviour of a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDescriptor {
    /// Column name, `-`, a reserved keyword, or `&`-joined columns
    pub name: String,
    pub operator: String,
    /// Used in place of an empty runtime value; never empty when present
    pub default_value: Option<String>,
    /// Postgres type the compared value is cast to, e.g. `timestamptz`
    pub cast: Option<String>,
    /// Zero values are significant and compiled instead of skipped
    pub empty: bool,
    pub no_update: bool,
    pub ignore_copy: bool,
}

impl TagDescriptor {
    /// Parse a tag string. Unknown modifiers are ignored.
    pub fn parse(tag: &str) -> Self {
        let mut segments = tag.split(',');
        let name = segments.next().unwrap_or_default().to_string();

        let mut descriptor = Self {
            name,
            operator: operators::EQUAL.to_string(),
            default_value: None,
            cast: None,
            empty: false,
            no_update: false,
            ignore_copy: false,
        };

        for segment in segments {
            let segment = segment.trim();

            match segment {
                modifiers::EMPTY => descriptor.empty = true,
                modifiers::NO_UPDATE => descriptor.no_update = true,
                modifiers::IGNORE_COPY => descriptor.ignore_copy = true,
                _ => {
                    if let Some(value) = segment.strip_prefix(modifiers::DEFAULT_PREFIX) {
                        descriptor.default_value =
                            (!value.is_empty()).then(|| value.to_string());
                    } else if let Some(cast) = segment.strip_prefix(modifiers::CAST_PREFIX) {
                        descriptor.cast = (!cast.is_empty()).then(|| cast.to_string());
                    } else if let Some(op) = segment.strip_prefix(modifiers::OP_PREFIX) {
                        if !op.is_empty() {
                            descriptor.operator = op.to_string();
                        }
                    }
                }
            }
        }

        descriptor
    }

    pub fn is_skipped(&self) -> bool {
        self.name == reserved::SKIP
    }

    pub fn is_reserved(&self) -> bool {
        reserved::ALL.contains(&self.name.as_str())
    }

    /// Column list of a `like_or` / `match` tag name
    pub fn field_list(&self) -> Vec<String> {
        self.name
            .split(FIELD_LIST_SEPARATOR)
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect()
    }
}
