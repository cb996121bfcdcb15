//! Read-through query cache with prefix invalidation.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::{CacheOptions, QueryKey};
use crate::core::error::Result;
use crate::events::{ClientEvent, EventBus};

/// A cached value together with its staleness, as returned by [`QueryCache::peek`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub is_stale: bool,
    pub age: Duration,
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    updated_at: Instant,
    last_access: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.updated_at.elapsed() < stale_time
    }
}

struct CacheInner {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    /// Per-key gates so concurrent reads of one key share a single fetch
    gates: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    /// Keys being fetched; `true` once an invalidation hit them mid-flight
    pending: Mutex<HashMap<QueryKey, bool>>,
    options: CacheOptions,
    events: Option<EventBus>,
}

/// Shared in-memory cache for remote reads.
///
/// Cloning is cheap and every clone sees the same entries. Reads go through
/// [`fetch`](Self::fetch); writes go through [`mutate`](Self::mutate), which
/// invalidates dependent keys only after the server confirmed the write.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(options: CacheOptions) -> Self {
        Self::build(options, None)
    }

    /// Cache that reports invalidations and failed mutations on `events`.
    pub fn with_events(options: CacheOptions, events: EventBus) -> Self {
        Self::build(options, Some(events))
    }

    fn build(options: CacheOptions, events: Option<EventBus>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                options,
                events,
            }),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    /// Return the cached value for `key` while it is fresh, otherwise run
    /// `fetcher` (with retries) and store its result.
    ///
    /// A failed fetch leaves any previous entry untouched.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh::<T>(&key) {
            trace!(key = %key, "Cache hit");
            return Ok(value);
        }

        let gate = self.gate(&key);
        let result = {
            let _guard = gate.lock().await;

            // Another caller may have filled the entry while we waited.
            if let Some(value) = self.fresh::<T>(&key) {
                trace!(key = %key, "Cache hit after waiting for in-flight fetch");
                Ok(value)
            } else {
                debug!(key = %key, "Cache miss, fetching");
                self.inner.pending.lock().insert(key.clone(), false);
                let fetched = self.fetch_with_retry(&key, &fetcher).await;
                let invalidated_in_flight = self.inner.pending.lock().remove(&key).unwrap_or(false);

                if let Ok(value) = &fetched {
                    self.store(key.clone(), value.clone(), invalidated_in_flight);
                }
                fetched
            }
        };

        self.release_gate(&key, gate);
        result
    }

    async fn fetch_with_retry<T, F, Fut>(&self, key: &QueryKey, fetcher: &F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.inner.options.retry && e.is_retryable() => {
                    let delay = self.inner.options.retry_delay_for(attempt);
                    warn!(
                        key = %key,
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Query failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Query failed");
                    return Err(e);
                }
            }
        }
    }

    /// Run a write. On success every key in `invalidates` (as a prefix) is
    /// marked stale; on failure the cache is left as it was and a
    /// [`ClientEvent::MutationFailed`] is emitted.
    pub async fn mutate<T, Fut>(
        &self,
        operation: &'static str,
        invalidates: &[QueryKey],
        write: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match write.await {
            Ok(value) => {
                let marked = self.invalidate_all(invalidates);
                debug!(operation, keys = invalidates.len(), entries = marked, "Mutation succeeded");
                Ok(value)
            }
            Err(e) => {
                warn!(operation, error = %e, "Mutation failed");
                self.emit(ClientEvent::MutationFailed {
                    operation,
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// Mark every entry whose key starts with `prefix` as stale. Returns the
    /// number of stored entries affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let marked = self.mark_stale(prefix);
        self.emit(ClientEvent::Invalidated(vec![prefix.clone()]));
        marked
    }

    /// [`invalidate`](Self::invalidate) for several prefixes, one event.
    pub fn invalidate_all(&self, prefixes: &[QueryKey]) -> usize {
        let marked = prefixes.iter().map(|prefix| self.mark_stale(prefix)).sum();
        if !prefixes.is_empty() {
            self.emit(ClientEvent::Invalidated(prefixes.to_vec()));
        }
        marked
    }

    fn mark_stale(&self, prefix: &QueryKey) -> usize {
        let mut marked = 0;
        {
            let mut entries = self.inner.entries.write();
            for (key, entry) in entries.iter_mut() {
                if key.starts_with(prefix) {
                    entry.invalidated = true;
                    marked += 1;
                }
            }
        }
        {
            let mut pending = self.inner.pending.lock();
            for (key, hit) in pending.iter_mut() {
                if key.starts_with(prefix) {
                    *hit = true;
                }
            }
        }
        debug!(prefix = %prefix, entries = marked, "Invalidated queries");
        marked
    }

    /// Cached value and staleness without fetching.
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<Cached<T>> {
        let entries = self.inner.entries.read();
        let entry = entries.get(key)?;
        let value = entry.value.downcast_ref::<T>()?.clone();
        Some(Cached {
            value,
            is_stale: !entry.is_fresh(self.inner.options.stale_time),
            age: entry.updated_at.elapsed(),
        })
    }

    /// Whether `key` would be served from cache right now.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .read()
            .get(key)
            .map(|entry| entry.is_fresh(self.inner.options.stale_time))
            .unwrap_or(false)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry (logout).
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.inner.entries.write();
            let n = entries.len();
            entries.clear();
            n
        };
        for hit in self.inner.pending.lock().values_mut() {
            *hit = true;
        }
        debug!(removed, "Query cache cleared");
    }

    /// Remove entries nobody read within the GC window. Returns how many
    /// were dropped.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.options.gc_time;
        let mut entries = self.inner.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.last_access.elapsed() < gc_time);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Garbage-collected queries");
        }
        removed
    }

    /// Spawn a task running [`collect_garbage`](Self::collect_garbage) every
    /// `interval` until the handle is aborted.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.collect_garbage();
            }
        })
    }

    fn fresh<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let mut entries = self.inner.entries.write();
        let entry = entries.get_mut(key)?;
        if !entry.is_fresh(self.inner.options.stale_time) {
            return None;
        }
        match entry.value.downcast_ref::<T>() {
            Some(value) => {
                entry.last_access = Instant::now();
                Some(value.clone())
            }
            None => {
                warn!(key = %key, "Cached value has a different type than requested, refetching");
                None
            }
        }
    }

    fn store<T: Send + Sync + 'static>(&self, key: QueryKey, value: T, invalidated: bool) {
        if invalidated {
            debug!(key = %key, "Query invalidated while in flight, storing as stale");
        }
        let now = Instant::now();
        self.inner.entries.write().insert(
            key,
            CacheEntry {
                value: Arc::new(value),
                updated_at: now,
                last_access: now,
                invalidated,
            },
        );
    }

    fn gate(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        self.inner
            .gates
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release_gate(&self, key: &QueryKey, gate: Arc<tokio::sync::Mutex<()>>) {
        let mut gates = self.inner.gates.lock();
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&gate) <= 2 {
            gates.remove(key);
        }
    }

    fn emit(&self, event: ClientEvent) {
        if let Some(events) = &self.inner.events {
            events.emit(event);
        }
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
