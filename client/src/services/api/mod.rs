//! # Backend API Client Module
//!
//! HTTP client for the marketplace REST backend. Every function is a thin,
//! stateless wrapper around one endpoint and returns
//! [`Result<T>`](crate::core::Result).
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs            - Module exports and shared helpers
//! ├── client.rs         - ApiClient, request/execute helpers, MarketplaceApi impl
//! ├── auth.rs           - Login, register, me, password recovery
//! ├── users.rs          - Public profiles, profile update
//! ├── notes.rs          - Catalogue, own/purchased notes, note CRUD
//! ├── dashboard.rs      - Sales history and stats
//! ├── withdrawals.rs    - Payout requests
//! ├── notifications.rs  - Inbox, unread count, read/clear
//! ├── ratings.rs        - Customer ratings
//! ├── profits.rs        - Earnings series and summary
//! └── payment.rs        - Checkout and purchase confirmation
//! ```

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod notes;
pub mod notifications;
pub mod payment;
pub mod profits;
pub mod ratings;
pub mod users;
pub mod withdrawals;

pub use client::{ApiClient, REQUEST_ID_HEADER, TRACE_ID_HEADER};

use crate::core::error::{ApiError, Result};

/// Reject ids that would change the request path.
pub(crate) fn path_segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidInput("Missing id".to_string()));
    }
    if id.contains(['/', '?', '#', '%']) || id.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidInput(format!("Invalid id '{id}'")));
    }
    Ok(id)
}
