//! # Client Events
//!
//! Side effects the embedding application reacts to: toasts for failed
//! mutations, navigation after a purchase, the audible cue for a pushed
//! notification, connection status for the notification channel.
//!
//! Events travel over a bounded `async_channel`. Emitting never blocks the
//! cache or the socket task: when the queue is full the oldest event is
//! dropped, so an application that never drains the bus holds at most
//! [`EVENT_CAPACITY`] events. The channel is multi-consumer but not a
//! broadcast: each event is delivered to exactly one receiver, normally the
//! application's UI loop.

use async_channel::{Receiver, Sender};
use shared::Notification;

use crate::cache::QueryKey;
use crate::realtime::RealtimeStatus;

/// Events kept for a slow or absent consumer before the oldest is dropped.
pub const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Cached reads were marked stale
    Invalidated(Vec<QueryKey>),
    /// A mutation failed; `message` is toast text
    MutationFailed {
        operation: &'static str,
        message: String,
    },
    /// The backend answered 401 and the session was cleared
    SessionExpired,
    /// Navigate the UI (after a confirmed purchase)
    Navigate { path: String },
    /// A notification was pushed; play the audible cue
    NotificationReceived(Notification),
    /// All notifications were cleared on another device
    NotificationsCleared,
    /// Notifications were marked read on another device
    NotificationsRead { ids: Vec<String> },
    /// Notification channel status changed
    RealtimeStatus(RealtimeStatus),
}

/// Cloneable sending half plus a receiver factory.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Sender<ClientEvent>,
    rx: Receiver<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    pub fn emit(&self, event: ClientEvent) {
        match self.tx.force_send(event) {
            Ok(None) => {}
            Ok(Some(dropped)) => tracing::trace!(?dropped, "Event queue full, dropped oldest"),
            Err(e) => tracing::warn!(error = %e, "Dropped client event"),
        }
    }

    /// Events currently queued.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn subscribe(&self) -> Receiver<ClientEvent> {
        self.rx.clone()
    }

    /// Drain everything currently queued (tests, shutdown).
    pub fn drain(&self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
