//! # Pagination
//!
//! Every list endpoint takes `page` (1-based) and `limit` query parameters
//! and answers with a [`Paginated`] envelope.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }

    /// Saturates at `u32::MAX` for totals that would not fit.
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 {
            return 0;
        }
        u32::try_from(self.total.div_ceil(u64::from(self.limit))).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Query string for list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}
