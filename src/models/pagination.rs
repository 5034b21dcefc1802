//! Pagination primitives shared by list endpoints.

use serde::{Deserialize, Serialize};

/// `?page=&per_page=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    const MAX_PER_PAGE: i64 = 100;
    const DEFAULT_PER_PAGE: i64 = 20;

    pub fn limit(&self) -> i64 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn current_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.current_page() - 1) * self.limit()
    }
}

/// Page of results plus the counts a list view needs for its pager.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages: (total.max(0) + per_page - 1) / per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(-4),
            per_page: Some(1000),
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn offset_and_page_count() {
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.offset(), 20);
        let result = PagedResult::new(vec!["a"], 21, &p);
        assert_eq!(result.total_pages, 3);
        assert_eq!(PagedResult::<u8>::new(vec![], 0, &p).total_pages, 0);
    }
}
