//! # Condition Compiler
//!
//! Turns a tagged record into an ordered [`OperationList`].
//!
//! Each field of the record carries a tag (see [`TagDescriptor`]) naming the
//! column and the operator to compile it with. Values travel as
//! [`serde_json::Value`], which gives the compiler a uniform view of zero
//! values, arrays and scalars regardless of the record's Rust types.
//!
//! ## Example
//!
//! ```rust
//! use query_conditions::{compile, tagged_record, OperationKind};
//!
//! struct AdultSearch {
//!     age: i64,
//!     page: i64,
//!     page_size: i64,
//! }
//!
//! tagged_record!(AdultSearch {
//!     age => "age,op:gte",
//!     page => "page",
//!     page_size => "page_size",
//! });
//!
//! let operations = compile(&AdultSearch { age: 18, page: 2, page_size: 5 }).unwrap();
//! assert_eq!(
//!     operations.kinds(),
//!     vec![OperationKind::Other, OperationKind::Pagination]
//! );
//! ```

use crate::config::CompilerConfig;
use crate::constants::{operators, reserved};
use crate::error::{QueryError, Result};
use crate::operation::{Operation, OperationList};
use crate::query_builder::ComparisonOperator;
use crate::scopes::QueryScopes;
use crate::tag::TagDescriptor;
use serde::Serialize;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// One field of a tagged record
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedField {
    pub name: &'static str,
    pub tag: &'static str,
    pub value: Value,
}

impl TaggedField {
    pub fn new(name: &'static str, tag: &'static str, value: Value) -> Self {
        Self { name, tag, value }
    }

    /// Build a field from any serializable value
    pub fn serialize<T: Serialize + ?Sized>(
        name: &'static str,
        tag: &'static str,
        value: &T,
    ) -> Result<Self> {
        Ok(Self::new(name, tag, serde_json::to_value(value)?))
    }
}

/// A record whose fields describe query conditions.
///
/// Fields are returned in declaration order. Implement it with
/// [`tagged_record!`](crate::tagged_record) rather than by hand.
pub trait TaggedRecord {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>>;
}

impl<T: TaggedRecord + ?Sized> TaggedRecord for &T {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>> {
        (**self).tagged_fields()
    }
}

impl<T: TaggedRecord + ?Sized> TaggedRecord for Box<T> {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>> {
        (**self).tagged_fields()
    }
}

impl<T: TaggedRecord + ?Sized> TaggedRecord for Arc<T> {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>> {
        (**self).tagged_fields()
    }
}

impl<T: TaggedRecord> TaggedRecord for Option<T> {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>> {
        match self {
            Some(record) => record.tagged_fields(),
            None => Ok(Vec::new()),
        }
    }
}

/// Implement [`TaggedRecord`] for a struct from a `field => "tag"` table.
///
/// Every listed field must implement `serde::Serialize`; fields left out of
/// the table never take part in compilation.
#[macro_export]
macro_rules! tagged_record {
    ($record:ty { $($field:ident => $tag:literal),* $(,)? }) => {
        impl $crate::compiler::TaggedRecord for $record {
            fn tagged_fields(
                &self,
            ) -> $crate::error::Result<::std::vec::Vec<$crate::compiler::TaggedField>> {
                Ok(vec![
                    $($crate::compiler::TaggedField::serialize(
                        stringify!($field),
                        $tag,
                        &self.$field,
                    )?,)*
                ])
            }
        }
    };
}

/// Paging state accumulated over a compile call
#[derive(Debug, Clone, Copy)]
struct PageState {
    page: i64,
    page_size: i64,
    has_page: bool,
    has_count: bool,
}

/// Compiles tagged records with a fixed [`CompilerConfig`]
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a record into operations: field conditions in declaration
    /// order, then sort, group-by and the paging operation
    pub fn compile<R: TaggedRecord + ?Sized>(&self, record: &R) -> Result<OperationList> {
        let fields = record.tagged_fields()?;
        let mut operations = OperationList::new();
        let mut sort_by = String::new();
        let mut group_by = String::new();
        let mut state = PageState {
            page: 0,
            page_size: self.config.default_page_size,
            has_page: true,
            has_count: true,
        };

        for field in fields {
            let tag = TagDescriptor::parse(field.tag);
            if tag.is_skipped() {
                trace!(field = field.name, "skipping untagged field");
                continue;
            }

            let Some(value) = resolve_value(&tag, field.value)? else {
                trace!(field = field.name, column = %tag.name, "suppressing empty value");
                continue;
            };

            match tag.name.as_str() {
                reserved::SORT_BY => sort_by = expect_string(&tag, &value)?,
                reserved::GROUP_BY => group_by = expect_string(&tag, &value)?,
                reserved::NO_COUNT => {
                    if value != Value::Bool(false) {
                        state.has_count = false;
                    }
                }
                reserved::PAGE => {
                    state.has_page = true;
                    state.page = expect_integer(&tag, &value)?;
                }
                reserved::PAGE_SIZE => {
                    state.has_page = true;
                    if state.page == 0 {
                        state.page = 1;
                    }
                    state.page_size = expect_integer(&tag, &value)?;
                }
                reserved::SELECT => operations.push(select_operation(&tag, &value)?),
                _ => operations.push(condition_operation(&tag, value)?),
            }
        }

        if !sort_by.is_empty() {
            operations.push(QueryScopes::sort(sort_by));
        }

        if !group_by.is_empty() {
            operations.push(QueryScopes::group_by(group_by));
        }

        if state.has_page && (state.has_count || !self.config.pagination_requires_count) {
            let page_size = if state.page_size <= 0 {
                self.config.default_page_size
            } else {
                state.page_size
            };
            operations.push(QueryScopes::page(state.page, page_size));
        }

        if !state.has_count {
            operations.push(QueryScopes::no_count());
        }

        debug!(
            operation_count = operations.len(),
            page = state.page,
            page_size = state.page_size,
            has_count = state.has_count,
            "compiled tagged record"
        );

        Ok(operations)
    }
}

/// Compile a record with the default configuration
pub fn compile<R: TaggedRecord + ?Sized>(record: &R) -> Result<OperationList> {
    Compiler::default().compile(record)
}

pub(crate) fn is_zero(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Apply suppression and defaults. `None` means the field takes no part.
fn resolve_value(tag: &TagDescriptor, value: Value) -> Result<Option<Value>> {
    let unset = is_absent(&value) || is_zero(&value);

    match tag.default_value {
        Some(ref default) if unset => coerce_default(tag, default, &value).map(Some),
        Some(_) => Ok(Some(value)),
        None if is_absent(&value) => Ok(None),
        None if is_zero(&value) && !tag.empty => Ok(None),
        None => Ok(Some(value)),
    }
}

/// Parse a default to the JSON type of the value it replaces
fn coerce_default(tag: &TagDescriptor, default: &str, shape: &Value) -> Result<Value> {
    match shape {
        Value::Number(_) => parse_number(default).ok_or_else(|| {
            QueryError::invalid_field(&tag.name, format!("default `{default}` is not a number"))
        }),
        Value::Bool(_) => default.parse::<bool>().map(Value::Bool).map_err(|_| {
            QueryError::invalid_field(&tag.name, format!("default `{default}` is not a boolean"))
        }),
        Value::Array(_) => Ok(Value::Array(
            default
                .split(',')
                .map(|item| infer_scalar(item.trim()))
                .collect(),
        )),
        Value::Null => Ok(infer_scalar(default)),
        Value::String(_) | Value::Object(_) => Ok(Value::String(default.to_string())),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn infer_scalar(text: &str) -> Value {
    if let Some(number) = parse_number(text) {
        return number;
    }
    match text.parse::<bool>() {
        Ok(flag) => Value::Bool(flag),
        Err(_) => Value::String(text.to_string()),
    }
}

fn expect_string(tag: &TagDescriptor, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(QueryError::invalid_field(
            &tag.name,
            format!("expected a string, got {other}"),
        )),
    }
}

fn expect_integer(tag: &TagDescriptor, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        QueryError::invalid_field(&tag.name, format!("expected an integer, got {value}"))
    })
}

/// Text of a scalar for LIKE patterns
fn expect_scalar_text(tag: &TagDescriptor, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(QueryError::invalid_field(
            &tag.name,
            format!("expected a scalar, got {other}"),
        )),
    }
}

fn expect_array(tag: &TagDescriptor, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(QueryError::invalid_field(
            &tag.name,
            format!("operator `{}` expects an array, got {other}", tag.operator),
        )),
    }
}

fn expect_field_list(tag: &TagDescriptor) -> Result<Vec<String>> {
    let fields = tag.field_list();
    if fields.is_empty() {
        return Err(QueryError::invalid_field(&tag.name, "no columns named"));
    }
    Ok(fields)
}

fn select_operation(tag: &TagDescriptor, value: &Value) -> Result<Operation> {
    let columns = match value {
        Value::String(column) => vec![column.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| expect_string(tag, item))
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(QueryError::invalid_field(
                &tag.name,
                format!("expected a column name or list, got {other}"),
            ))
        }
    };
    Ok(QueryScopes::select(&columns))
}

fn condition_operation(tag: &TagDescriptor, value: Value) -> Result<Operation> {
    let field = tag.name.clone();

    let comparison = match tag.operator.as_str() {
        operators::EQUAL => Some(ComparisonOperator::Equal),
        operators::NOT_EQUAL => Some(ComparisonOperator::NotEqual),
        operators::LT => Some(ComparisonOperator::LessThan),
        operators::LTE => Some(ComparisonOperator::LessThanOrEqual),
        operators::GT => Some(ComparisonOperator::GreaterThan),
        operators::GTE => Some(ComparisonOperator::GreaterThanOrEqual),
        _ => None,
    };
    if let Some(operator) = comparison {
        return comparison_operation(tag, field, operator, value);
    }

    let operation = match tag.operator.as_str() {
        operators::LIKE => QueryScopes::like(field, &expect_scalar_text(tag, &value)?),
        operators::LIKE_OR => {
            let text = expect_scalar_text(tag, &value)?;
            QueryScopes::like_or(&text, &expect_field_list(tag)?)
        }
        operators::IN => QueryScopes::in_list(field, expect_array(tag, value)?),
        operators::NOT_IN => QueryScopes::not_in_list(field, expect_array(tag, value)?),
        operators::JSON_CONTAINS => QueryScopes::json_contains(field, value),
        operators::MATCH => QueryScopes::full_text(&expect_field_list(tag)?, value),
        raw_condition => QueryScopes::raw(raw_condition, vec![value]),
    };

    Ok(operation)
}

fn comparison_operation(
    tag: &TagDescriptor,
    field: String,
    operator: ComparisonOperator,
    value: Value,
) -> Result<Operation> {
    let Some(ref cast) = tag.cast else {
        return Ok(QueryScopes::compare(field, operator, value));
    };

    // the cast is written into the statement verbatim
    let valid = cast
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | '[' | ']'));
    if !valid {
        return Err(QueryError::invalid_field(
            &tag.name,
            format!("`{cast}` is not a type name"),
        ));
    }
    Ok(QueryScopes::compare_as(field, operator, value, cast.clone()))
}
