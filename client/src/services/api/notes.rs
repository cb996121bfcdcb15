//! # Note Endpoints
//!
//! Public catalogue, the seller's own notes, the buyer's purchases, and
//! note CRUD.

use reqwest::Method;
use shared::{CreateNoteRequest, Note, NoteFilters, PageQuery, Paginated, UpdateNoteRequest};

use super::client::ApiClient;
use super::path_segment;
use crate::core::error::Result;

/// Catalogue page. Filters travel as query parameters next to `page`/`limit`.
#[tracing::instrument(skip(client, filters), fields(page = page.page, limit = page.limit))]
pub async fn list_notes(
    client: &ApiClient,
    page: PageQuery,
    filters: &NoteFilters,
) -> Result<Paginated<Note>> {
    let request = client
        .request(Method::GET, "/notes")
        .query(&page)
        .query(filters);
    client.execute(request).await
}

pub async fn get_note(client: &ApiClient, id: &str) -> Result<Note> {
    let path = format!("/notes/{}", path_segment(id)?);
    client.execute(client.request(Method::GET, &path)).await
}

pub async fn my_notes(client: &ApiClient, page: PageQuery) -> Result<Paginated<Note>> {
    client
        .execute(client.request(Method::GET, "/notes/mine").query(&page))
        .await
}

pub async fn purchased_notes(client: &ApiClient, page: PageQuery) -> Result<Paginated<Note>> {
    client
        .execute(client.request(Method::GET, "/notes/purchased").query(&page))
        .await
}

#[tracing::instrument(skip(client, request), fields(title = %request.title))]
pub async fn create_note(client: &ApiClient, request: CreateNoteRequest) -> Result<Note> {
    let note: Note = client
        .execute(client.request(Method::POST, "/notes").json(&request))
        .await?;
    tracing::info!(note_id = %note.id, "Note created");
    Ok(note)
}

#[tracing::instrument(skip(client, request))]
pub async fn update_note(client: &ApiClient, id: &str, request: UpdateNoteRequest) -> Result<Note> {
    let path = format!("/notes/{}", path_segment(id)?);
    client
        .execute(client.request(Method::PATCH, &path).json(&request))
        .await
}

#[tracing::instrument(skip(client))]
pub async fn delete_note(client: &ApiClient, id: &str) -> Result<()> {
    let path = format!("/notes/{}", path_segment(id)?);
    client.execute_empty(client.request(Method::DELETE, &path)).await?;
    tracing::info!("Note deleted");
    Ok(())
}
