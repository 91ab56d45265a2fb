use crate::constants::DEFAULT_PAGE_SIZE;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// Represents pagination parameters for SQL queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Create pagination from a 1-based page number and page size.
    ///
    /// `page == 0` is treated as the first page, a negative page disables
    /// paging entirely (export-all), and a non-positive page size falls back
    /// to the default of 10. Offsets saturate at `i64::MAX`, the largest
    /// OFFSET Postgres and MySQL accept.
    pub fn from_page(page: i64, page_size: i64) -> Self {
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        if page < 0 {
            return Self::unbounded();
        }

        let page = page.max(1) as u64;
        let page_size = page_size as u64;
        Self {
            limit: Some(page_size),
            offset: Some((page - 1).saturating_mul(page_size).min(MAX_OFFSET)),
        }
    }

    /// No LIMIT and no OFFSET
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            offset: None,
        }
    }

    /// Create pagination with only limit
    pub fn limit_only(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }
}
