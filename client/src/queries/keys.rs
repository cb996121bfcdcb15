//! Cache keys of every query, in one place so mutations and the
//! notification channel invalidate exactly what the reads store.
//!
//! Root keys (`notes()`, `dashboard()`, ..) are prefixes used for
//! invalidation; the others address a single read.

use shared::{NoteFilters, PageQuery, ProfitRange};

use crate::cache::QueryKey;
use crate::query_key;

pub fn me() -> QueryKey {
    query_key!["me"]
}

pub fn user(id: &str) -> QueryKey {
    query_key!["user", id]
}

pub fn notes() -> QueryKey {
    query_key!["notes"]
}

/// `["notes", "all", page, limit, search, university, course, min, max, sort]`
pub fn notes_list(page: PageQuery, filters: &NoteFilters) -> QueryKey {
    query_key![
        "notes",
        "all",
        page.page,
        page.limit,
        filters.search.as_deref(),
        filters.university.as_deref(),
        filters.course.as_deref(),
        filters.min_price.map(|p| p.normalize().to_string()),
        filters.max_price.map(|p| p.normalize().to_string()),
        filters.sort.as_str(),
    ]
}

pub fn my_notes(page: PageQuery) -> QueryKey {
    query_key!["notes", "mine", page.page, page.limit]
}

pub fn purchased_notes(page: PageQuery) -> QueryKey {
    query_key!["notes", "purchased", page.page, page.limit]
}

pub fn note(id: &str) -> QueryKey {
    query_key!["note", id]
}

pub fn sales_root() -> QueryKey {
    query_key!["sales"]
}

pub fn sales(page: PageQuery) -> QueryKey {
    query_key!["sales", page.page, page.limit]
}

pub fn dashboard() -> QueryKey {
    query_key!["dashboard"]
}

pub fn dashboard_stats() -> QueryKey {
    query_key!["dashboard", "stats"]
}

pub fn withdrawals() -> QueryKey {
    query_key!["withdrawals"]
}

pub fn withdrawals_page(page: PageQuery) -> QueryKey {
    query_key!["withdrawals", page.page, page.limit]
}

pub fn notifications() -> QueryKey {
    query_key!["notifications"]
}

pub fn notifications_page(page: PageQuery) -> QueryKey {
    query_key!["notifications", "list", page.page, page.limit]
}

pub fn unread_count() -> QueryKey {
    query_key!["notifications", "unread-count"]
}

pub fn note_ratings(note_id: &str) -> QueryKey {
    query_key!["customer-rating", note_id]
}

pub fn profits() -> QueryKey {
    query_key!["profits"]
}

pub fn profit_series(range: ProfitRange) -> QueryKey {
    query_key!["profits", range.as_str()]
}

pub fn profit_summary() -> QueryKey {
    query_key!["profits", "summary"]
}
