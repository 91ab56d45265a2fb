use super::SqlString;

/// Represents different types of SQL JOINs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Represents a SQL JOIN clause. The table is quoted for the dialect; the ON
/// condition is written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub alias: Option<String>,
    pub on_condition: Option<String>,
}

impl Join {
    pub fn new(join_type: JoinType, table: &str, on_condition: &str) -> Self {
        Self {
            join_type,
            table: table.to_string(),
            alias: None,
            on_condition: Some(on_condition.to_string()),
        }
    }

    /// Create an INNER JOIN
    pub fn inner(table: &str, on_condition: &str) -> Self {
        Self::new(JoinType::Inner, table, on_condition)
    }

    /// Create a LEFT JOIN
    pub fn left(table: &str, on_condition: &str) -> Self {
        Self::new(JoinType::Left, table, on_condition)
    }

    /// Create a CROSS JOIN
    pub fn cross(table: &str) -> Self {
        Self {
            join_type: JoinType::Cross,
            table: table.to_string(),
            alias: None,
            on_condition: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn to_sql(&self, sql: &mut SqlString) {
        sql.append_syntax(self.join_type.to_sql());
        sql.append_syntax(" ");
        sql.append_identifier(&self.table);

        if let Some(ref alias) = self.alias {
            sql.append_syntax(" AS ");
            sql.append_identifier(alias);
        }

        if let Some(ref condition) = self.on_condition {
            sql.append_syntax(" ON ");
            sql.append_syntax(condition);
        }
    }
}
