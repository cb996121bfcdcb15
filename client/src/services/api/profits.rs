//! # Profit Endpoints

use reqwest::Method;
use shared::{ProfitPoint, ProfitRange, ProfitSummary};

use super::client::ApiClient;
use crate::core::error::Result;

/// Earnings series bucketed by `range`.
pub async fn profits(client: &ApiClient, range: ProfitRange) -> Result<Vec<ProfitPoint>> {
    let request = client
        .request(Method::GET, "/profits")
        .query(&[("range", range.as_str())]);
    client.execute(request).await
}

pub async fn profit_summary(client: &ApiClient) -> Result<ProfitSummary> {
    client
        .execute(client.request(Method::GET, "/profits/summary"))
        .await
}
