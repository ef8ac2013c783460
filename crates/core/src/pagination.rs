//! Page-number pagination for list endpoints.

use crate::error::CoreError;

/// Page used when the caller does not ask for one.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page size served; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a page window from optional query parameters.
    ///
    /// Absent values fall back to page 1 / size 10. Zero or negative values
    /// are rejected; sizes above [`MAX_PAGE_SIZE`] are clamped.
    pub fn from_params(page: Option<i64>, page_size: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(CoreError::invalid("page", "must be a positive integer"));
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            return Err(CoreError::invalid("limit", "must be a positive integer"));
        }
        Ok(Self {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// Rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
