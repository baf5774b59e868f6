//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DEFAULT_PAGE_SIZE, PageRequest};

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-based).
    pub page: i64,
    /// Items per page.
    pub page_size: i64,
    /// Total number of items.
    pub total: i64,
    /// Total number of pages.
    pub total_pages: i64,
}

impl PaginationMeta {
    /// Metadata for `page` out of `total` rows.
    #[must_use]
    pub const fn new(page: PageRequest, total: i64) -> Self {
        Self {
            page: page.page(),
            page_size: page.page_size(),
            total,
            total_pages: page.total_pages(total),
        }
    }
}

/// Body of a `201 Created` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    /// Identifier of the new resource.
    pub id: uuid::Uuid,
}

pub(crate) const fn default_page() -> i64 {
    1
}

pub(crate) const fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}
