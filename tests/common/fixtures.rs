use query_conditions::compiler::{TaggedField, TaggedRecord};
use query_conditions::test_utils::MockSession;
use query_conditions::{tagged_record, Dialect, Model, Result, SessionContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub status: i64,
}

impl Model for User {
    fn table_name() -> &'static str {
        "users"
    }
}

impl User {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            status: 1,
        }
    }
}

/// Model with a nullable column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub referrer_id: Option<i64>,
}

impl Model for Contact {
    fn table_name() -> &'static str {
        "contacts"
    }
}

/// Search record covering the common operators and the paging keywords
#[derive(Debug, Clone, Default)]
pub struct UserSearch {
    pub age: i64,
    pub name: String,
    pub status: i64,
    pub ids: Vec<i64>,
    pub keyword: String,
    pub sort_by: String,
    pub page: i64,
    pub page_size: i64,
    pub no_count: bool,
    pub internal_note: String,
}

tagged_record!(UserSearch {
    age => "age,op:gte",
    name => "name,op:like",
    status => "status",
    ids => "id,op:in",
    keyword => "name&email,op:like_or",
    sort_by => "sort_by",
    page => "page",
    page_size => "page_size",
    no_count => "no_count",
    internal_note => "-",
});

/// Record built from an explicit field list
#[derive(Debug, Clone, Default)]
pub struct Fields(pub Vec<TaggedField>);

impl Fields {
    pub fn one(tag: &'static str, value: serde_json::Value) -> Self {
        Self(vec![TaggedField::new("field", tag, value)])
    }

    pub fn with(mut self, tag: &'static str, value: serde_json::Value) -> Self {
        self.0.push(TaggedField::new("field", tag, value));
        self
    }
}

impl TaggedRecord for Fields {
    fn tagged_fields(&self) -> Result<Vec<TaggedField>> {
        Ok(self.0.clone())
    }
}

/// A mock session and a context carrying it
pub fn mock_context(dialect: Dialect) -> (Arc<MockSession>, SessionContext) {
    let session = Arc::new(MockSession::with_dialect(dialect));
    let ctx = SessionContext::with_session(session.clone());
    (session, ctx)
}
