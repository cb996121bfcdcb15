//! # User Endpoints

use reqwest::Method;
use shared::{UpdateProfileRequest, User};

use super::client::ApiClient;
use super::path_segment;
use crate::core::error::Result;

/// Public profile of any user.
pub async fn user_profile(client: &ApiClient, id: &str) -> Result<User> {
    let path = format!("/users/{}", path_segment(id)?);
    client.execute(client.request(Method::GET, &path)).await
}

/// Update the signed-in user's own profile.
#[tracing::instrument(skip_all)]
pub async fn update_profile(client: &ApiClient, request: UpdateProfileRequest) -> Result<User> {
    client
        .execute(client.request(Method::PATCH, "/users/me").json(&request))
        .await
}
