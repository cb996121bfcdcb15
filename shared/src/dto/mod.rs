//! # Data Transfer Objects (DTOs)
//!
//! All data structures exchanged with the marketplace backend over REST and
//! over the notification channel.
//!
//! ## Module Organization
//!
//! - [`auth`] - Login, registration, users, error bodies
//! - [`note`] - Note listings and catalogue filters
//! - [`sale`] - Seller sales and dashboard counters
//! - [`withdrawal`] - Payout requests
//! - [`notification`] - In-app notifications
//! - [`rating`] - Customer ratings
//! - [`profit`] - Profit chart and summary
//! - [`payment`] - Checkout and purchase confirmation
//! - [`pagination`] - List envelope and page query
//!
//! ## Serialization Format
//!
//! - **Field naming**: camelCase on the wire (`#[serde(rename_all = "camelCase")]`)
//! - **Optional request fields**: omitted when `None`
//! - **Enums**: lowercase / kebab-case strings
//! - **Money**: `rust_decimal::Decimal`, sent as JSON numbers
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /auth/login
//! Content-Type: application/json
//!
//! {"email": "ada@uni.edu", "password": "Secret123"}
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//!
//! {
//!   "accessToken": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
//!   "user": {"id": "u1", "firstName": "Ada", "lastName": "Lovelace", ...}
//! }
//! ```

pub mod auth;
pub mod note;
pub mod notification;
pub mod pagination;
pub mod payment;
pub mod profit;
pub mod rating;
pub mod sale;
pub mod withdrawal;

pub use auth::*;
pub use note::*;
pub use notification::*;
pub use pagination::*;
pub use payment::*;
pub use profit::*;
pub use rating::*;
pub use sale::*;
pub use withdrawal::*;
