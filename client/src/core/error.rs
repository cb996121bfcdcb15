//! # Common Error Types
//!
//! Every service call in the client returns [`Result<T>`], i.e.
//! `Result<T, ApiError>`. Callers branch on [`ApiError::kind`] instead of
//! inspecting message strings.
//!
//! ## Error Categories
//!
//! - **Transport**: `Network`, `Timeout`, `Decode`
//! - **HTTP status**: `Unauthorized`, `Forbidden`, `NotFound`, `Validation`,
//!   `Conflict`, `RateLimited`, `Server`
//! - **Local**: `Config`, `InvalidInput`
//!
//! ## Usage Pattern
//!
//! ```rust
//! use notemarket::core::error::{ApiError, ErrorKind};
//!
//! let err = ApiError::NotFound("Note not found".to_string());
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert!(!err.is_retryable());
//! ```

use reqwest::StatusCode;
use shared::ErrorResponse;
use thiserror::Error;

/// Tag of an [`ApiError`], cheap to copy and match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    RateLimited,
    Server,
    Decode,
    Config,
    InvalidInput,
}

/// Client-wide error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset connection.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// 401. The session has been cleared by the time this is returned.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 / 422 with the backend's per-field messages in `details`.
    #[error("Validation error: {message}")]
    Validation { message: String, details: Vec<String> },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected locally before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Timeout => ErrorKind::Timeout,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::RateLimited => ErrorKind::RateLimited,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Config(_) => ErrorKind::Config,
            ApiError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Transient failures worth one more attempt from the query cache.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server | ErrorKind::RateLimited
        )
    }

    /// Short text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Timeout => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            // A bare 401 carries the canonical reason; a credential failure
            // carries the backend's own text ("Invalid credentials").
            ApiError::Unauthorized(msg) if !msg.is_empty() && msg != UNAUTHORIZED_REASON => msg.clone(),
            ApiError::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::RateLimited => "Too many requests. Please wait a moment.".to_string(),
            ApiError::Server { .. } | ApiError::Decode(_) | ApiError::Config(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }

    /// Map a non-success status and its (optional) parsed body.
    pub fn from_status(status: StatusCode, body: Option<ErrorResponse>) -> Self {
        let message = body
            .as_ref()
            .map(ErrorResponse::summary)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
                details: body.map(|b| b.details()).unwrap_or_default(),
                message,
            },
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

const UNAUTHORIZED_REASON: &str = "Unauthorized";

/// Convenience type alias for `Result<T, ApiError>`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorMessage;

    fn body(message: ErrorMessage) -> ErrorResponse {
        ErrorResponse {
            status_code: None,
            message,
            error: None,
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from_status(StatusCode::NOT_FOUND, None).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, None).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, None),
            ApiError::RateLimited
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, None),
            ApiError::Server {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_validation_keeps_details() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            Some(body(ErrorMessage::Many(vec![
                "iban must be a valid IBAN".into(),
                "amount must be positive".into(),
            ]))),
        );
        match err {
            ApiError::Validation { message, details } => {
                assert_eq!(message, "iban must be a valid IBAN; amount must be positive");
                assert_eq!(details.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(ApiError::Server { status: 503, message: String::new() }.is_retryable());
        assert!(!ApiError::NotFound("gone".into()).is_retryable());
        assert!(!ApiError::InvalidInput("bad".into()).is_retryable());
    }

    #[test]
    fn test_unauthorized_message_prefers_backend_text() {
        let rejected = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            Some(body(ErrorMessage::One("Invalid credentials".into()))),
        );
        assert_eq!(rejected.user_message(), "Invalid credentials");

        let bare = ApiError::from_status(StatusCode::UNAUTHORIZED, None);
        assert_eq!(bare.user_message(), "Your session has expired. Please log in again.");
        assert_eq!(
            ApiError::Unauthorized(String::new()).user_message(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_user_message_hides_server_details() {
        let err = ApiError::Server {
            status: 500,
            message: "NullPointerException at line 42".into(),
        };
        assert!(!err.user_message().contains("NullPointer"));
        assert_eq!(
            ApiError::Conflict("Note already purchased".into()).user_message(),
            "Note already purchased"
        );
    }
}
