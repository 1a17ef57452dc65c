//! Page requests and paged results shared by list queries.

use serde::Serialize;

use crate::domain::foundation::ValidationError;

/// A validated page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::out_of_range(
                "page",
                1,
                i64::from(u32::MAX),
                i64::from(page),
            ));
        }
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::out_of_range(
                "limit",
                1,
                i64::from(Self::MAX_LIMIT),
                i64::from(limit),
            ));
        }
        Ok(Self { page, limit })
    }

    /// Missing values fall back to page 1 and the default limit.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Result<Self, ValidationError> {
        Self::new(page.unwrap_or(1), limit.unwrap_or(Self::DEFAULT_LIMIT))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn total_pages(&self) -> u64 {
        let limit = u64::from(self.request.limit());
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            page: self.request.page(),
            limit: self.request.limit(),
            total: self.total,
            total_pages: self.total_pages(),
        }
    }
}

/// Pagination block of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}
