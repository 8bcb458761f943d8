//! Pagination extractor.

use quill_config::PaginationConfig;
use quill_core::PageRequest;
use serde::Deserialize;

/// Raw `page` / `limit` query parameters.
///
/// Kept as strings so that garbage falls back to the defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PaginationQuery {
    /// Resolves the query against the configured limits.
    #[must_use]
    pub fn page_request(&self, config: &PaginationConfig) -> PageRequest {
        PageRequest::from_query(
            self.page.as_deref(),
            self.limit.as_deref(),
            config.default_limit,
            config.max_limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> PaginationQuery {
        PaginationQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let request = PaginationQuery::default().page_request(&PaginationConfig::default());
        assert_eq!(request, PageRequest::new(1, 10));
    }

    #[test]
    fn test_garbage_values_use_defaults() {
        let config = PaginationConfig::default();
        assert_eq!(
            query(Some("abc"), Some("-5")).page_request(&config),
            PageRequest::new(1, 10)
        );
        assert_eq!(
            query(Some("0"), Some("")).page_request(&config),
            PageRequest::new(1, 10)
        );
    }

    #[test]
    fn test_limit_is_clamped_to_configured_ceiling() {
        let config = PaginationConfig {
            default_limit: 5,
            max_limit: 20,
        };
        assert_eq!(
            query(Some("3"), Some("500")).page_request(&config),
            PageRequest::with_ceiling(3, 20, 20)
        );
    }
}
