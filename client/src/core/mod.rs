//! # Core Abstractions
//!
//! Error type and the service trait that the query layer depends on.
//!
//! - **[`error`]**: [`ApiError`], [`ErrorKind`], [`Result<T>`]
//! - **[`service`]**: [`MarketplaceApi`], implemented by
//!   [`ApiClient`](crate::services::api::ApiClient) and by test fakes
//!
//! ## Dependency Injection
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notemarket::core::MarketplaceApi;
//!
//! // In production: the HTTP client
//! let api: Arc<dyn MarketplaceApi> = Arc::new(ApiClient::new(&config, session, events)?);
//!
//! // In tests: an in-memory fake
//! let api: Arc<dyn MarketplaceApi> = Arc::new(FakeApi::default());
//! ```

pub mod error;
pub mod service;

pub use error::{ApiError, ErrorKind, Result};
pub use service::MarketplaceApi;
