//! # Withdrawal DTOs
//!
//! A withdrawal is a seller's request to cash out accumulated balance to a
//! bank account identified by IBAN.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl WithdrawalStatus {
    /// Only pending requests can still be edited or cancelled.
    pub fn is_editable(&self) -> bool {
        matches!(self, WithdrawalStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub amount: Decimal,
    pub iban: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// `POST /withdrawals`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateWithdrawalRequest {
    pub amount: Decimal,
    pub iban: String,
}

/// `PATCH /withdrawals/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateWithdrawalRequest {
    pub iban: String,
}
