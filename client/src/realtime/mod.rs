//! # Real-Time Notifications
//!
//! One persistent socket per session to the backend's `/notifications`
//! namespace. Pushed events feed the same invalidation path as mutations:
//!
//! | Event | Cache | Client event |
//! |---|---|---|
//! | `notification` | invalidate `["notifications"]` | [`NotificationReceived`] (play the cue) |
//! | `clear` | invalidate `["notifications"]` | [`NotificationsCleared`] |
//! | `read` | invalidate `["notifications"]` | [`NotificationsRead`] |
//! | reconnect | invalidate `["notifications"]` | [`RealtimeStatus`](crate::events::ClientEvent::RealtimeStatus) |
//!
//! [`NotificationReceived`]: crate::events::ClientEvent::NotificationReceived
//! [`NotificationsCleared`]: crate::events::ClientEvent::NotificationsCleared
//! [`NotificationsRead`]: crate::events::ClientEvent::NotificationsRead

pub mod channel;
pub mod frame;
pub mod state;

use chrono::{DateTime, Utc};

pub use channel::{socket_url, NotificationChannel, ServerEvent, NAMESPACE};
pub use state::{ConnectionEvent, ConnectionMachine, ConnectionState, ReconnectPolicy};

/// Snapshot of the notification channel for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RealtimeStatus {
    pub state: ConnectionState,
    /// Connection attempts since the channel was spawned
    pub connection_attempts: u64,
    pub last_error: Option<String>,
    pub last_connected: Option<DateTime<Utc>>,
    pub messages_received: u64,
    pub last_message: Option<DateTime<Utc>>,
}
