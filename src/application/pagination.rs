//! Offset pagination helpers.

use serde::Serialize;

use crate::application::query::QueryError;

/// Validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Reject `page < 1`, `page_size < 1` and sizes above `max_page_size`.
    pub fn new(page: u32, page_size: u32, max_page_size: u32) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::validation("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(QueryError::validation("page size must be at least 1"));
        }
        if page_size > max_page_size {
            return Err(QueryError::validation(format!(
                "page size {page_size} exceeds the maximum of {max_page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Half-open index range `[start, end)` of this page.
    fn bounds(&self) -> (usize, usize) {
        let size = self.page_size as usize;
        let start = (self.page as usize - 1).saturating_mul(size);
        (start, start.saturating_add(size))
    }
}

/// Page-size bounds applied to incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl From<&crate::config::QuerySettings> for PageLimits {
    fn from(settings: &crate::config::QuerySettings) -> Self {
        Self {
            default_page_size: settings.default_page_size.get(),
            max_page_size: settings.max_page_size.get(),
        }
    }
}

impl PageLimits {
    pub fn request(&self, page: u32, page_size: Option<u32>) -> Result<PageRequest, QueryError> {
        PageRequest::new(
            page,
            page_size.unwrap_or(self.default_page_size),
            self.max_page_size,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: usize,
    pub items_per_page: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationInfo {
    pub fn new(request: PageRequest, total_items: usize) -> Self {
        let total_pages = total_items.div_ceil(request.page_size() as usize);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        Self {
            current_page: request.page(),
            total_pages,
            total_items,
            items_per_page: request.page_size(),
            has_previous: request.page() > 1,
            has_next: request.page() < total_pages,
        }
    }
}

/// One page of entities with the pagination descriptor and the filters that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResult<T, F> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
    pub filters: F,
}

/// Slice one page out of `items`. A start past the end yields an empty page.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> (Vec<T>, usize) {
    let total = items.len();
    let (start, end) = request.bounds();
    let page = if start >= total {
        Vec::new()
    } else {
        items[start..end.min(total)].to_vec()
    };
    (page, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: u32, size: u32) -> PageRequest {
        PageRequest::new(page, size, 100).expect("valid request")
    }

    #[test]
    fn rejects_zero_page_and_size() {
        assert!(matches!(
            PageRequest::new(0, 10, 100),
            Err(QueryError::Validation(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 0, 100),
            Err(QueryError::Validation(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 101, 100),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn pages_partition_the_sequence() {
        let items: Vec<u32> = (0..23).collect();
        let mut rebuilt = Vec::new();
        for page in 1..=5 {
            let (slice, total) = paginate(&items, request(page, 5));
            assert_eq!(total, 23);
            rebuilt.extend(slice);
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let items: Vec<u32> = (0..20).collect();
        let (slice, total) = paginate(&items, request(5, 5));
        assert!(slice.is_empty());
        assert_eq!(total, 20);
    }

    #[test]
    fn pagination_info_flags() {
        let info = PaginationInfo::new(request(5, 5), 20);
        assert_eq!(info.total_pages, 4);
        assert!(info.has_previous);
        assert!(!info.has_next);

        let info = PaginationInfo::new(request(1, 10), 3);
        assert_eq!(info.total_pages, 1);
        assert!(!info.has_previous);
        assert!(!info.has_next);

        let empty = PaginationInfo::new(request(1, 10), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn limits_apply_default_page_size() {
        let limits = PageLimits::default();
        let request = limits.request(2, None).expect("valid");
        assert_eq!(request.page_size(), 10);
        assert!(limits.request(1, Some(500)).is_err());
    }
}
