//! # Notification DTOs
//!
//! Used both by `/notifications/*` and by the push channel payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Sale,
    Withdrawal,
    Rating,
    #[default]
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `GET /notifications/unread-count`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: u64,
}

/// Payload of the `read` push event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsReadPayload {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_field() {
        let body = r#"{"id":"1","title":"New sale","message":"Someone bought your note","type":"sale","createdAt":"2024-03-01T10:00:00Z"}"#;
        let n: Notification = serde_json::from_str(body).unwrap();
        assert_eq!(n.kind, NotificationKind::Sale);
        assert!(!n.read);
    }
}
