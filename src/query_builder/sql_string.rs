use super::Dialect;
use serde_json::Value;

/// A rendered statement: SQL text plus its bind parameters, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Low-level SQL accumulator. Values only ever enter through
/// [`SqlString::append_param`], which writes a dialect placeholder.
#[derive(Debug, Clone)]
pub struct SqlString {
    dialect: Dialect,
    sql: String,
    params: Vec<Value>,
}

impl SqlString {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    pub fn append_identifier(&mut self, identifier: &str) {
        let quoted = self.dialect.quote_identifier(identifier);
        self.sql.push_str(&quoted);
    }

    /// Bind `param` behind a placeholder. `NULL` is written literally so the
    /// store types it from context.
    pub fn append_param(&mut self, param: Value) {
        if param.is_null() {
            self.sql.push_str("NULL");
            return;
        }
        self.params.push(param);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Bind `param` with an explicit type on Postgres (`$1::timestamptz`).
    /// MySQL converts string parameters implicitly and gets a plain `?`.
    pub fn append_typed_param(&mut self, param: Value, cast: Option<&str>) {
        let typed = !param.is_null() && self.dialect == Dialect::Postgres;
        self.append_param(param);
        if let (true, Some(cast)) = (typed, cast) {
            self.sql.push_str("::");
            self.sql.push_str(cast);
        }
    }

    /// Append a comma separated placeholder list for `values`
    pub fn append_param_list(&mut self, values: &[Value]) {
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                self.sql.push_str(", ");
            }
            self.append_param(value.clone());
        }
    }

    /// Append a raw fragment that uses `?` placeholders. Each `?` outside a
    /// quoted literal consumes the next parameter; array parameters expand to
    /// a parenthesised placeholder list.
    pub fn append_raw(&mut self, fragment: &str, params: &[Value]) {
        let mut remaining = params.iter();
        let mut in_literal = false;

        for ch in fragment.chars() {
            match ch {
                '\'' => {
                    in_literal = !in_literal;
                    self.sql.push(ch);
                }
                '?' if !in_literal => match remaining.next() {
                    Some(Value::Array(items)) => {
                        self.sql.push('(');
                        self.append_param_list(items);
                        self.sql.push(')');
                    }
                    Some(value) => self.append_param(value.clone()),
                    None => self.sql.push(ch),
                },
                _ => self.sql.push(ch),
            }
        }

        let unused = remaining.count();
        if unused > 0 {
            tracing::warn!(
                fragment = %fragment,
                unused = unused,
                "raw condition has more parameters than placeholders"
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}
