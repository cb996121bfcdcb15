//! # Withdrawal Endpoints
//!
//! Payout requests against the seller's available balance. Only pending
//! withdrawals can be edited or cancelled; the backend enforces it and
//! answers 409 otherwise.

use reqwest::Method;
use shared::{CreateWithdrawalRequest, PageQuery, Paginated, UpdateWithdrawalRequest, Withdrawal};

use super::client::ApiClient;
use super::path_segment;
use crate::core::error::Result;

pub async fn withdrawals(client: &ApiClient, page: PageQuery) -> Result<Paginated<Withdrawal>> {
    client
        .execute(client.request(Method::GET, "/withdrawals").query(&page))
        .await
}

#[tracing::instrument(skip(client, request), fields(amount = %request.amount))]
pub async fn create_withdrawal(
    client: &ApiClient,
    request: CreateWithdrawalRequest,
) -> Result<Withdrawal> {
    let withdrawal: Withdrawal = client
        .execute(client.request(Method::POST, "/withdrawals").json(&request))
        .await?;
    tracing::info!(withdrawal_id = %withdrawal.id, "Withdrawal requested");
    Ok(withdrawal)
}

#[tracing::instrument(skip(client, request))]
pub async fn update_withdrawal(
    client: &ApiClient,
    id: &str,
    request: UpdateWithdrawalRequest,
) -> Result<Withdrawal> {
    let path = format!("/withdrawals/{}", path_segment(id)?);
    client
        .execute(client.request(Method::PATCH, &path).json(&request))
        .await
}

#[tracing::instrument(skip(client))]
pub async fn cancel_withdrawal(client: &ApiClient, id: &str) -> Result<()> {
    let path = format!("/withdrawals/{}", path_segment(id)?);
    client.execute_empty(client.request(Method::DELETE, &path)).await
}
