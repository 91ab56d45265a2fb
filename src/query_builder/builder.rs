use super::{Condition, Dialect, Join, Pagination, SqlString, Statement, WhereClause};
use crate::database::{Model, Row};
use crate::error::{QueryError, Result};
use serde_json::Value;

/// Conflict handling for INSERT statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    /// Skip rows that collide with an existing key
    Ignore,
    /// Overwrite `update_columns` of the existing row; `target` names the
    /// unique columns (Postgres requires it, MySQL infers it)
    Update {
        target: Vec<String>,
        update_columns: Vec<String>,
    },
}

/// Query handle that operations transform. Immutable in spirit: every
/// modifier takes `self` by value and returns the augmented builder, and
/// nothing is executed until a statement is rendered and handed to a session.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    table: Option<String>,
    select_fields: Vec<String>,
    count_select: Option<String>,
    joins: Vec<Join>,
    where_clauses: Vec<WhereClause>,
    group_by: Vec<String>,
    having: Vec<WhereClause>,
    order_by: Vec<String>,
    pagination: Option<Pagination>,
    update_columns: Vec<String>,
    conflict: Option<ConflictAction>,
}

impl QueryBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            select_fields: Vec::new(),
            count_select: None,
            joins: Vec::new(),
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
            update_columns: Vec::new(),
            conflict: None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Target a table by name
    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Target the table of a model
    pub fn model<M: Model>(self) -> Self {
        self.table(M::table_name())
    }

    /// Target `table` unless a table was already chosen
    pub fn with_default_table(mut self, table: &str) -> Self {
        if self.table.is_none() {
            self.table = Some(table.to_string());
        }
        self
    }

    /// Set specific fields to select; repeated calls accumulate
    pub fn select<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.select_fields
            .extend(fields.iter().map(|f| f.as_ref().to_string()));
        self
    }

    /// Expression counted by the count statement instead of `*`
    pub fn count_select(mut self, expression: &str) -> Self {
        self.count_select = Some(expression.to_string());
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a condition joined with AND
    pub fn where_clause(mut self, condition: Condition) -> Self {
        self.where_clauses.push(WhereClause::and(condition));
        self
    }

    /// Add a condition joined with OR
    pub fn or_where(mut self, condition: Condition) -> Self {
        self.where_clauses.push(WhereClause::or(condition));
        self
    }

    pub fn group_by(mut self, expression: &str) -> Self {
        self.group_by.push(expression.to_string());
        self
    }

    pub fn having(mut self, condition: Condition) -> Self {
        self.having.push(WhereClause::and(condition));
        self
    }

    pub fn order_by(mut self, expression: &str) -> Self {
        self.order_by.push(expression.to_string());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Add LIMIT clause
    pub fn limit(mut self, limit: u64) -> Self {
        match self.pagination {
            Some(ref mut pagination) => pagination.limit = Some(limit),
            None => self.pagination = Some(Pagination::limit_only(limit)),
        }
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        match self.pagination {
            Some(ref mut pagination) => pagination.offset = Some(offset),
            None => {
                self.pagination = Some(Pagination {
                    limit: None,
                    offset: Some(offset),
                })
            }
        }
        self
    }

    /// Restrict the columns an UPDATE writes
    pub fn update_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.update_columns
            .extend(columns.iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn on_conflict(mut self, action: ConflictAction) -> Self {
        self.conflict = Some(action);
        self
    }

    pub fn insert_ignore(self) -> Self {
        self.on_conflict(ConflictAction::Ignore)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn has_conditions(&self) -> bool {
        !self.where_clauses.is_empty()
    }

    pub fn update_column_list(&self) -> &[String] {
        &self.update_columns
    }

    pub fn conflict(&self) -> Option<&ConflictAction> {
        self.conflict.as_ref()
    }

    fn require_table(&self, operation: &str) -> Result<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| QueryError::missing_table(operation))
    }

    fn push_from(&self, sql: &mut SqlString, table: &str) {
        sql.append_syntax(" FROM ");
        sql.append_identifier(table);

        for join in &self.joins {
            sql.append_syntax(" ");
            join.to_sql(sql);
        }
    }

    fn push_where(&self, sql: &mut SqlString) {
        if !self.where_clauses.is_empty() {
            sql.append_syntax(" WHERE ");
            WhereClause::list_to_sql(&self.where_clauses, sql);
        }
    }

    fn push_grouping(&self, sql: &mut SqlString) {
        if !self.group_by.is_empty() {
            sql.append_syntax(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        if !self.having.is_empty() {
            sql.append_syntax(" HAVING ");
            WhereClause::list_to_sql(&self.having, sql);
        }
    }

    fn push_select_list(&self, sql: &mut SqlString) {
        if self.select_fields.is_empty() {
            sql.append_syntax("*");
        } else {
            sql.append_syntax(&self.select_fields.join(", "));
        }
    }

    /// Build the SELECT statement for the data query
    pub fn build_select(&self) -> Result<Statement> {
        let table = self.require_table("select")?;
        let mut sql = SqlString::new(self.dialect);

        sql.append_syntax("SELECT ");
        self.push_select_list(&mut sql);
        self.push_from(&mut sql, table);
        self.push_where(&mut sql);
        self.push_grouping(&mut sql);

        if !self.order_by.is_empty() {
            sql.append_syntax(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        if let Some(ref pagination) = self.pagination {
            sql.append_syntax(&pagination.to_sql());
        }

        Ok(sql.finish())
    }

    /// Build the COUNT statement. Ordering and pagination never take part;
    /// grouped or HAVING-filtered queries are counted through a subquery.
    pub fn build_count(&self) -> Result<Statement> {
        let table = self.require_table("count")?;
        let mut sql = SqlString::new(self.dialect);
        let counted = self.count_select.as_deref().unwrap_or("*");

        if self.group_by.is_empty() && self.having.is_empty() {
            sql.append_syntax(&format!("SELECT COUNT({counted})"));
            self.push_from(&mut sql, table);
            self.push_where(&mut sql);
        } else {
            sql.append_syntax("SELECT COUNT(*) FROM (SELECT ");
            match self.count_select {
                Some(ref expression) => sql.append_syntax(expression),
                None if self.group_by.is_empty() => sql.append_syntax("1"),
                None => sql.append_syntax(&self.group_by.join(", ")),
            }
            self.push_from(&mut sql, table);
            self.push_where(&mut sql);
            self.push_grouping(&mut sql);
            sql.append_syntax(") AS counted");
        }

        Ok(sql.finish())
    }

    /// Build the statement fetching a single column
    pub fn build_pluck(&self, column: &str) -> Result<Statement> {
        let mut plucked = self.clone();
        plucked.select_fields = vec![column.to_string()];
        plucked.build_select()
    }

    /// Build a (multi-row) INSERT. Columns come from the first row; missing
    /// values in later rows are written as NULL.
    pub fn build_insert(&self, rows: &[Row]) -> Result<Statement> {
        let table = self.require_table("insert")?;
        let columns: Vec<String> = match rows.first() {
            Some(first) => first.keys().cloned().collect(),
            None => return Err(QueryError::invalid_field(table, "insert without rows")),
        };
        if columns.is_empty() {
            return Err(QueryError::invalid_field(table, "insert without columns"));
        }

        let mut sql = SqlString::new(self.dialect);
        let ignore_modifier = matches!(
            (self.dialect, &self.conflict),
            (Dialect::MySql, Some(ConflictAction::Ignore))
        );
        sql.append_syntax(if ignore_modifier {
            "INSERT IGNORE INTO "
        } else {
            "INSERT INTO "
        });
        sql.append_identifier(table);
        sql.append_syntax(" (");
        self.push_identifier_list(&mut sql, &columns);
        sql.append_syntax(") VALUES ");

        for (row_index, row) in rows.iter().enumerate() {
            if row_index > 0 {
                sql.append_syntax(", ");
            }
            let values: Vec<Value> = columns
                .iter()
                .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                .collect();
            sql.append_syntax("(");
            sql.append_param_list(&values);
            sql.append_syntax(")");
        }

        self.push_conflict(&mut sql);
        Ok(sql.finish())
    }

    fn push_identifier_list(&self, sql: &mut SqlString, columns: &[String]) {
        for (index, column) in columns.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(", ");
            }
            sql.append_identifier(column);
        }
    }

    fn push_conflict(&self, sql: &mut SqlString) {
        match (self.dialect, &self.conflict) {
            (_, None) | (Dialect::MySql, Some(ConflictAction::Ignore)) => {}
            (Dialect::Postgres, Some(ConflictAction::Ignore)) => {
                sql.append_syntax(" ON CONFLICT DO NOTHING");
            }
            (
                Dialect::Postgres,
                Some(ConflictAction::Update {
                    target,
                    update_columns,
                }),
            ) => {
                sql.append_syntax(" ON CONFLICT");
                if !target.is_empty() {
                    sql.append_syntax(" (");
                    self.push_identifier_list(sql, target);
                    sql.append_syntax(")");
                }
                if update_columns.is_empty() {
                    sql.append_syntax(" DO NOTHING");
                } else {
                    sql.append_syntax(" DO UPDATE SET ");
                    for (index, column) in update_columns.iter().enumerate() {
                        if index > 0 {
                            sql.append_syntax(", ");
                        }
                        sql.append_identifier(column);
                        sql.append_syntax(" = EXCLUDED.");
                        sql.append_identifier(column);
                    }
                }
            }
            (Dialect::MySql, Some(ConflictAction::Update { update_columns, .. })) => {
                if update_columns.is_empty() {
                    return;
                }
                sql.append_syntax(" ON DUPLICATE KEY UPDATE ");
                for (index, column) in update_columns.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(", ");
                    }
                    sql.append_identifier(column);
                    sql.append_syntax(" = VALUES(");
                    sql.append_identifier(column);
                    sql.append_syntax(")");
                }
            }
        }
    }

    /// Build an UPDATE writing `assignments`. Refuses to render without a
    /// WHERE clause.
    pub fn build_update(&self, assignments: &Row) -> Result<Statement> {
        let table = self.require_table("update")?;
        if !self.has_conditions() {
            return Err(QueryError::missing_where_clause("update", table));
        }
        if assignments.is_empty() {
            return Err(QueryError::invalid_field(table, "update without columns"));
        }

        let mut sql = SqlString::new(self.dialect);
        sql.append_syntax("UPDATE ");
        sql.append_identifier(table);
        sql.append_syntax(" SET ");
        for (index, (column, value)) in assignments.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(", ");
            }
            sql.append_identifier(column);
            sql.append_syntax(" = ");
            sql.append_param(value.clone());
        }
        self.push_where(&mut sql);

        Ok(sql.finish())
    }

    /// Build a DELETE. Refuses to render without a WHERE clause.
    pub fn build_delete(&self) -> Result<Statement> {
        let table = self.require_table("delete")?;
        if !self.has_conditions() {
            return Err(QueryError::missing_where_clause("delete", table));
        }

        let mut sql = SqlString::new(self.dialect);
        sql.append_syntax("DELETE FROM ");
        sql.append_identifier(table);
        self.push_where(&mut sql);

        Ok(sql.finish())
    }
}
