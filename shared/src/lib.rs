//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the marketplace client and the
//! backend API. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//! - **[`utils`]**: Display helpers (prices, IBAN masking, names)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shared::dto::auth::{AuthResponse, LoginRequest};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let request = LoginRequest {
//!     email: "ada@uni.edu".to_string(),
//!     password: "Secret123".to_string(),
//! };
//!
//! let response: AuthResponse = reqwest::Client::new()
//!     .post("http://localhost:3000/auth/login")
//!     .json(&request)
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! println!("{}", response.user.full_name());
//! # Ok(())
//! # }
//! ```

pub mod dto;
pub mod utils;

// DTO library: every export is public API
pub use dto::*;
pub use utils::*;
