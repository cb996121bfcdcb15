//! # Customer Rating Endpoints

use reqwest::Method;
use shared::{CreateRatingRequest, CustomerRating};

use super::client::ApiClient;
use super::path_segment;
use crate::core::error::Result;

pub async fn note_ratings(client: &ApiClient, note_id: &str) -> Result<Vec<CustomerRating>> {
    let path = format!("/customer-rating/note/{}", path_segment(note_id)?);
    client.execute(client.request(Method::GET, &path)).await
}

/// Rate a purchased note. A second rating of the same note answers 409.
#[tracing::instrument(skip(client, request), fields(note_id = %request.note_id, rating = request.rating))]
pub async fn create_rating(client: &ApiClient, request: CreateRatingRequest) -> Result<CustomerRating> {
    client
        .execute(client.request(Method::POST, "/customer-rating").json(&request))
        .await
}
