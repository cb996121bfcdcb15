//! # Payment Endpoints
//!
//! Checkout opens a hosted payment page; confirmation is called with the
//! session id the payment provider redirects back with.

use reqwest::Method;
use shared::{CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, PurchaseConfirmation};

use super::client::ApiClient;
use crate::core::error::Result;

#[tracing::instrument(skip(client, request), fields(note_id = %request.note_id))]
pub async fn checkout(client: &ApiClient, request: CheckoutRequest) -> Result<CheckoutSession> {
    let session: CheckoutSession = client
        .execute(client.request(Method::POST, "/payment/checkout").json(&request))
        .await?;
    tracing::info!(session_id = %session.session_id, "Checkout session opened");
    Ok(session)
}

#[tracing::instrument(skip(client, request), fields(session_id = %request.session_id))]
pub async fn confirm_payment(
    client: &ApiClient,
    request: ConfirmPaymentRequest,
) -> Result<PurchaseConfirmation> {
    let confirmation: PurchaseConfirmation = client
        .execute(client.request(Method::POST, "/payment/confirm").json(&request))
        .await?;
    tracing::info!(
        note_id = %confirmation.note_id,
        sale_id = %confirmation.sale_id,
        "Purchase confirmed"
    );
    Ok(confirmation)
}
