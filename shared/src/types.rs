//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Largest page a listing endpoint will return
pub const MAX_PAGE_SIZE: i64 = 500;

/// Default page size for listing endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Limit/offset pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Check the page bounds, naming the offending field on failure
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.limit < 1 || self.limit > MAX_PAGE_SIZE {
            return Err(("limit", "Limit must be between 1 and 500"));
        }
        if self.offset < 0 {
            return Err(("offset", "Offset must not be negative"));
        }
        Ok(())
    }
}

/// Response body carrying a human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
