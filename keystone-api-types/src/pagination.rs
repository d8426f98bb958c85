//! Pagination input and list envelopes

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 500;

/// Page-based pagination parameters as they arrive from the API layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationInput {
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
}

impl Default for PaginationInput {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationInput {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit()
    }

    pub fn limit(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// A page of results plus the total count independent of the page window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: PaginationInput) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.limit(),
        }
    }
}
