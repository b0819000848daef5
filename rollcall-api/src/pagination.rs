//! Pagination utilities for list endpoints

use rollcall_common::{Error, Result};

/// Page number used when the request omits one
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request omits one
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size served; larger requests are capped
pub const MAX_LIMIT: i64 = 100;

/// Validated pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Build a pagination window from optional request values
    ///
    /// Pages past the end are allowed and simply return no rows.
    ///
    /// # Examples
    /// ```
    /// use rollcall_api::pagination::Pagination;
    ///
    /// let p = Pagination::new(Some(2), Some(5)).unwrap();
    /// assert_eq!(p.offset, 5);
    ///
    /// // Oversized pages get capped
    /// let p = Pagination::new(None, Some(1000)).unwrap();
    /// assert_eq!(p.limit, 100);
    /// ```
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(Error::InvalidInput(format!("page must be >= 1, got {}", page)));
        }
        if limit < 1 {
            return Err(Error::InvalidInput(format!("limit must be >= 1, got {}", limit)));
        }

        let limit = limit.min(MAX_LIMIT);
        let offset = (page - 1).saturating_mul(limit);

        Ok(Self {
            page,
            limit,
            offset,
        })
    }

    /// Number of pages needed for `total` rows
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}
