//! # Utility Functions
//!
//! - **[`validation`]**: Input validation gating form submission (email,
//!   password, names, IBAN, prices, ratings)
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: Display helpers (IBAN masking, price formatting)
//! - [`crate::forms`]: Forms built on these rules

pub mod validation;
