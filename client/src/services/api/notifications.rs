//! # Notification Endpoints

use reqwest::Method;
use shared::{Notification, PageQuery, Paginated, UnreadCount};

use super::client::ApiClient;
use super::path_segment;
use crate::core::error::Result;

pub async fn notifications(client: &ApiClient, page: PageQuery) -> Result<Paginated<Notification>> {
    client
        .execute(client.request(Method::GET, "/notifications").query(&page))
        .await
}

pub async fn unread_count(client: &ApiClient) -> Result<UnreadCount> {
    client
        .execute(client.request(Method::GET, "/notifications/unread-count"))
        .await
}

pub async fn mark_notification_read(client: &ApiClient, id: &str) -> Result<()> {
    let path = format!("/notifications/{}/read", path_segment(id)?);
    client.execute_empty(client.request(Method::PATCH, &path)).await
}

pub async fn mark_all_notifications_read(client: &ApiClient) -> Result<()> {
    client
        .execute_empty(client.request(Method::PATCH, "/notifications/read-all"))
        .await
}

pub async fn clear_notifications(client: &ApiClient) -> Result<()> {
    client
        .execute_empty(client.request(Method::DELETE, "/notifications"))
        .await
}
