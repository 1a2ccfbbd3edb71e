//! Page-based pagination utilities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Maximum number of rows per page.
pub const MAX_PER_PAGE: u32 = 200;

/// Error type for `Content-Range` parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentRangeError {
    #[error("Invalid content range format")]
    InvalidFormat,
    #[error("Invalid number in content range")]
    InvalidNumber,
}

/// Page request as received from query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageRequest {
    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Rows per page, clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Row offset of the first row in the page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.per_page())
    }

    /// Maximum number of rows to fetch.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page())
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl PageInfo {
    pub fn new(request: &PageRequest, total: Option<u64>) -> Self {
        Self {
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }
}

/// Parses the total row count out of a PostgREST `Content-Range` header.
///
/// Accepted forms: `0-24/3573`, `*/0`, and `0-24/*` (total unknown).
pub fn parse_content_range_total(value: &str) -> Result<Option<u64>, ContentRangeError> {
    let (range, total) = value
        .trim()
        .split_once('/')
        .ok_or(ContentRangeError::InvalidFormat)?;

    if range != "*" {
        let (start, end) = range
            .split_once('-')
            .ok_or(ContentRangeError::InvalidFormat)?;
        start
            .parse::<u64>()
            .map_err(|_| ContentRangeError::InvalidNumber)?;
        end.parse::<u64>()
            .map_err(|_| ContentRangeError::InvalidNumber)?;
    }

    if total == "*" {
        return Ok(None);
    }

    total
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ContentRangeError::InvalidNumber)
}
