//! Local pagination state held by list handles.

use shared::PageQuery;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 1-based page cursor with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    limit: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Advance unless already on the last of `total_pages`.
    pub fn next_page(&mut self, total_pages: u32) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Changing the page size starts over at page 1.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.page = 1;
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}
