//! Page-number pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// `?page=&limit=` query parameters.
///
/// Out-of-range values are clamped rather than rejected: page 0 reads as
/// page 1 and limits above 100 read as 100.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// SQL `OFFSET` for this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit())
    }
}

/// Pagination metadata returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    #[must_use]
    pub fn new(params: PageParams, total: u64) -> Self {
        let limit = u64::from(params.limit());
        let page = params.page();
        let total_pages = u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX);
        Self {
            current_page: page,
            total_pages,
            total,
            has_next: u64::from(page) * limit < total,
            has_prev: page > 1,
        }
    }
}

/// A page of items with its pagination metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let total = u64::try_from(total).unwrap_or(0);
        Self {
            items,
            pagination: Pagination::new(params, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_middle_page() {
        let p = Pagination::new(PageParams { page: 2, limit: 10 }, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_pagination_last_page_and_empty() {
        let p = Pagination::new(PageParams { page: 3, limit: 10 }, 25);
        assert!(!p.has_next);

        let empty = Pagination::new(PageParams::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_params_are_clamped() {
        let params = PageParams { page: 0, limit: 500 };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 0);
        assert_eq!(PageParams { page: 3, limit: 20 }.offset(), 40);
    }
}
