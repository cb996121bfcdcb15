//! Checkout and purchase confirmation.

use shared::{CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, PurchaseConfirmation};

use super::{keys, QueryContext};
use crate::core::Result;
use crate::events::ClientEvent;

/// Route of a note's detail page.
pub fn note_path(note_id: &str) -> String {
    format!("/notes/{note_id}")
}

pub struct PaymentQueries {
    ctx: QueryContext,
}

impl PaymentQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Open a hosted checkout for `note_id`. Nothing is cached or
    /// invalidated until the payment is confirmed.
    pub async fn checkout(&self, note_id: &str) -> Result<CheckoutSession> {
        let request = CheckoutRequest {
            note_id: note_id.to_string(),
        };
        self.ctx
            .cache
            .mutate("checkout", &[], self.ctx.api.checkout(request))
            .await
    }

    /// Confirm the payment the provider redirected back with, then send the
    /// user to the purchased note.
    pub async fn confirm(&self, session_id: &str) -> Result<PurchaseConfirmation> {
        let request = ConfirmPaymentRequest {
            session_id: session_id.to_string(),
        };
        // The purchased note is only known from the reply.
        let confirmation = self
            .ctx
            .cache
            .mutate("confirm_payment", &[], self.ctx.api.confirm_payment(request))
            .await?;

        self.ctx.cache.invalidate_all(&[
            keys::notes(),
            keys::note(&confirmation.note_id),
            keys::sales_root(),
            keys::dashboard(),
        ]);
        self.ctx.events.emit(ClientEvent::Navigate {
            path: note_path(&confirmation.note_id),
        });
        Ok(confirmation)
    }
}
