//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to 1..=100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}

/// Builds pagination metadata and the slice bounds for a list of `total`
/// items.
#[must_use]
pub fn paginate(params: &PaginationParams, total: u32) -> (PaginationMeta, usize, usize) {
    let params = params.clamped();
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.per_page)
    };
    // Offset math in u64: page and per_page are caller-controlled and
    // u32::MAX * 100 overflows u32. Past-the-end pages yield an empty slice.
    let offset = u64::from(params.page - 1) * u64::from(params.per_page);
    let start = usize::try_from(offset.min(u64::from(total))).unwrap_or(usize::MAX);
    let meta = PaginationMeta {
        page: params.page,
        per_page: params.per_page,
        total,
        total_pages,
    };
    (meta, start, params.per_page as usize)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn paginate_splits_into_pages() {
        let params = PaginationParams {
            page: 2,
            per_page: 20,
        };
        let (meta, start, take) = paginate(&params, 45);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(start, 20);
        assert_eq!(take, 20);
    }

    #[test]
    fn paginate_empty_list_has_zero_pages() {
        let params = PaginationParams {
            page: 1,
            per_page: 20,
        };
        let (meta, start, _) = paginate(&params, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(start, 0);
    }

    #[test]
    fn paginate_clamps_out_of_range_params() {
        let params = PaginationParams {
            page: 0,
            per_page: 5000,
        };
        let (meta, _, take) = paginate(&params, 10);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 100);
        assert_eq!(take, 100);
    }

    #[test]
    fn paginate_extreme_page_yields_empty_page() {
        let params = PaginationParams {
            page: u32::MAX,
            per_page: 100,
        };
        let (meta, start, _) = paginate(&params, 10);
        assert_eq!(meta.page, u32::MAX);
        assert_eq!(start, 10);
    }
}
