//! # Profit DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Time window for the profit chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfitRange {
    Week,
    #[default]
    Month,
    Year,
}

impl ProfitRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfitRange::Week => "week",
            ProfitRange::Month => "month",
            ProfitRange::Year => "year",
        }
    }
}

/// One bucket of the profit chart (`period` is a backend label such as `2024-05`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfitPoint {
    pub period: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub total: Decimal,
    pub this_month: Decimal,
    pub last_month: Decimal,
}

impl ProfitSummary {
    /// Month-over-month growth in percent, `None` when last month was zero.
    pub fn growth_percent(&self) -> Option<Decimal> {
        if self.last_month.is_zero() {
            return None;
        }
        Some(((self.this_month - self.last_month) / self.last_month * Decimal::ONE_HUNDRED).round_dp(2))
    }
}
