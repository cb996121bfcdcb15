//! # Services Module
//!
//! External service integrations of the marketplace client.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              queries (Marketplace)           │
//! │                                              │
//! │   ┌──────────────────┐  ┌──────────────────┐ │
//! │   │ ApiClient        │  │ NotificationChan │ │
//! │   │ (services::api)  │  │ (realtime)       │ │
//! │   └────────┬─────────┘  └────────┬─────────┘ │
//! └────────────┼─────────────────────┼───────────┘
//!              │ HTTP/JSON           │ WebSocket (Socket.IO)
//!              ▼                     ▼
//! ┌──────────────────────────────────────────────┐
//! │   Backend: /auth /users /notes /dashboard    │
//! │   /withdrawals /notifications /profits       │
//! │   /customer-rating /payment  ns:/notifications│
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;

pub use api::ApiClient;
