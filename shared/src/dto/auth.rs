//! # Authentication and User DTOs
//!
//! Request and response bodies for `/auth/*` and `/users/*`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
}

/// Authentication response (login/register success)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

/// A marketplace account as returned by the backend.
///
/// `balance` is the seller balance available for withdrawal; it is zero for
/// accounts that never sold anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        crate::utils::full_name(&self.first_name, &self.last_name)
    }
}

/// Partial profile update (`PATCH /users/me`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Forgot-password request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request (token comes from the emailed link)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Error message field: the backend sends either one string or a list of
/// per-field validation messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Error response
///
/// ```text
/// {"statusCode":400,"message":["email must be an email"],"error":"Bad Request"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    pub message: ErrorMessage,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// All messages joined into one line.
    pub fn summary(&self) -> String {
        match &self.message {
            ErrorMessage::One(msg) => msg.clone(),
            ErrorMessage::Many(msgs) => msgs.join("; "),
        }
    }

    /// Individual messages (one element for a plain string message).
    pub fn details(&self) -> Vec<String> {
        match &self.message {
            ErrorMessage::One(msg) => vec![msg.clone()],
            ErrorMessage::Many(msgs) => msgs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_with_message_list() {
        let body = r#"{"statusCode":400,"message":["email must be an email","password is too short"],"error":"Bad Request"}"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.status_code, Some(400));
        assert_eq!(err.summary(), "email must be an email; password is too short");
        assert_eq!(err.details().len(), 2);
    }

    #[test]
    fn test_error_response_with_single_message() {
        let body = r#"{"message":"Invalid credentials"}"#;
        let err: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.summary(), "Invalid credentials");
        assert_eq!(err.error, None);
    }

    #[test]
    fn test_user_defaults_for_optional_fields() {
        let body = r#"{
            "id": "u1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@uni.edu",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let user: User = serde_json::from_str(body).unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.balance, Decimal::ZERO);
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let req = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@uni.edu".into(),
            password: "Secret123".into(),
            university: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert!(json.get("university").is_none());
    }
}
