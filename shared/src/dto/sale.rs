//! # Sales and Dashboard DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Completed,
    Refunded,
}

/// One sold copy of a note, seen from the seller's dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub note_id: String,
    pub note_title: String,
    #[serde(default)]
    pub buyer_name: Option<String>,
    pub amount: Decimal,
    pub commission: Decimal,
    pub net_amount: Decimal,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
}

/// Seller dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sales: u64,
    pub total_revenue: Decimal,
    pub available_balance: Decimal,
    pub published_notes: u64,
}
