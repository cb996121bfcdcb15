//! # Query Cache
//!
//! Read-through cache shared by every query handle.
//!
//! ## Contract
//!
//! - A read is addressed by a [`QueryKey`], an ordered tuple of primitives
//!   built with [`query_key!`](crate::query_key). Identical keys share one
//!   cached result while it is fresh.
//! - A write is never cached. When it succeeds, the keys it names are marked
//!   stale by prefix, so the next read goes back to the server.
//! - A failed write changes nothing in the cache.
//! - Nothing is updated optimistically.
//!
//! ```text
//! fetch(["notes","all",1,12]) ──hit──────────────▶ cached Paginated<Note>
//!            │
//!            └─miss/stale─▶ fetcher() ─ok─▶ store ─▶ value
//!                              │
//!                              └─retryable err─▶ sleep ─▶ fetcher() (once)
//!
//! mutate("delete_note", [["notes"], ["note", id]], api.delete_note(id))
//!            └─ok─▶ mark ["notes", ..] and ["note", id] stale
//! ```

mod key;
mod store;

use std::time::Duration;

pub use key::{KeyPart, QueryKey};
pub use store::{Cached, QueryCache};

/// Timing and retry policy of a [`QueryCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fetched value is served without refetching
    pub stale_time: Duration,
    /// How long an entry nobody reads is kept before garbage collection
    pub gc_time: Duration,
    /// Extra attempts after a retryable failure
    pub retry: u32,
    /// Base delay before a retry, doubled per attempt, capped at 30 s
    pub retry_delay: Duration,
}

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

impl CacheOptions {
    pub fn retry_delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(5 * 60),
            retry: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}
