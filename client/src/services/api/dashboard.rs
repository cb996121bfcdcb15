//! # Dashboard Endpoints
//!
//! Seller-side sales history and headline figures.

use reqwest::Method;
use shared::{DashboardStats, PageQuery, Paginated, Sale};

use super::client::ApiClient;
use crate::core::error::Result;

pub async fn sales(client: &ApiClient, page: PageQuery) -> Result<Paginated<Sale>> {
    client
        .execute(client.request(Method::GET, "/dashboard/sales").query(&page))
        .await
}

pub async fn dashboard_stats(client: &ApiClient) -> Result<DashboardStats> {
    client
        .execute(client.request(Method::GET, "/dashboard/stats"))
        .await
}
