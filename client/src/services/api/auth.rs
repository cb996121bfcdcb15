//! # Authentication Endpoints
//!
//! Login, registration, the current user and password recovery.

use reqwest::Method;
use shared::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    ResetPasswordRequest, User,
};

use super::client::ApiClient;
use crate::core::error::Result;

/// Login with email and password.
#[tracing::instrument(skip(client, request), fields(email = %request.email))]
pub async fn login(client: &ApiClient, request: LoginRequest) -> Result<AuthResponse> {
    tracing::info!("Attempting login");
    let start = std::time::Instant::now();

    let result = client
        .execute::<AuthResponse>(client.request(Method::POST, "/auth/login").json(&request))
        .await;

    match &result {
        Ok(auth) => tracing::info!(
            user_id = %auth.user.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Login successful"
        ),
        Err(e) => tracing::warn!(error = %e, "Login failed"),
    }
    result
}

/// Create an account. The backend signs the new user in directly.
#[tracing::instrument(skip(client, request), fields(email = %request.email))]
pub async fn register(client: &ApiClient, request: RegisterRequest) -> Result<AuthResponse> {
    client
        .execute(client.request(Method::POST, "/auth/register").json(&request))
        .await
}

pub async fn me(client: &ApiClient) -> Result<User> {
    client.execute(client.request(Method::GET, "/auth/me")).await
}

pub async fn forgot_password(
    client: &ApiClient,
    request: ForgotPasswordRequest,
) -> Result<MessageResponse> {
    client
        .execute(client.request(Method::POST, "/auth/forgot-password").json(&request))
        .await
}

pub async fn reset_password(
    client: &ApiClient,
    request: ResetPasswordRequest,
) -> Result<MessageResponse> {
    client
        .execute(client.request(Method::POST, "/auth/reset-password").json(&request))
        .await
}
