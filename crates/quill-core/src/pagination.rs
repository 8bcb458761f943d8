//! Pagination types for feed listings.

use serde::{Deserialize, Serialize};

/// A request for one page of the feed.
///
/// Pages are 1-indexed. The limit is clamped to a ceiling at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (1-indexed).
    pub page: u32,
    /// The number of items per page.
    pub limit: u32,
}

impl PageRequest {
    /// The default page number.
    pub const DEFAULT_PAGE: u32 = 1;
    /// The default page size.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// The maximum allowed page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a new page request using the default ceiling.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self::with_ceiling(page, limit, Self::MAX_LIMIT)
    }

    /// Creates a page request with an explicit page-size ceiling.
    ///
    /// A zero page or zero limit falls back to the defaults.
    #[must_use]
    pub fn with_ceiling(page: u32, limit: u32, max_limit: u32) -> Self {
        let page = if page == 0 { Self::DEFAULT_PAGE } else { page };
        let limit = if limit == 0 { Self::DEFAULT_LIMIT } else { limit };
        Self {
            page,
            limit: limit.min(max_limit.max(1)),
        }
    }

    /// Creates a page request for the first page with default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT)
    }

    /// Builds a page request from raw query-string values.
    ///
    /// Values that are missing, non-numeric, zero or negative use the
    /// defaults (`page = 1`, `limit = default_limit`); `limit` is clamped to
    /// `max_limit`.
    #[must_use]
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let page = parse_positive(page).unwrap_or(Self::DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(default_limit);
        Self::with_ceiling(page, limit, max_limit)
    }

    /// Returns the offset for store queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Returns the limit for store queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_request_max_limit() {
        let req = PageRequest::new(1, 1000);
        assert_eq!(req.limit, PageRequest::MAX_LIMIT);
    }

    #[test]
    fn test_page_request_first() {
        let req = PageRequest::first();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_zero_values_use_defaults() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req, PageRequest::first());
    }

    #[test]
    fn test_from_query_defaults() {
        let req = PageRequest::from_query(None, None, 10, 100);
        assert_eq!(req, PageRequest::first());
    }

    #[test]
    fn test_from_query_invalid_values() {
        let req = PageRequest::from_query(Some("abc"), Some("-5"), 10, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);

        let req = PageRequest::from_query(Some("0"), Some("0"), 10, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
    }

    #[test]
    fn test_from_query_clamps_limit() {
        let req = PageRequest::from_query(Some("2"), Some("5000"), 10, 100);
        assert_eq!(req.page, 2);
        assert_eq!(req.limit, 100);
        assert_eq!(req.offset(), 100);
    }

    #[test]
    fn test_custom_ceiling() {
        let req = PageRequest::from_query(Some("1"), Some("5000"), 10, 10_000);
        assert_eq!(req.limit, 5000);
    }
}
