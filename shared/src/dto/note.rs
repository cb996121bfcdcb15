//! # Note DTOs
//!
//! Study-note listings and the filters accepted by `GET /notes`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Seller summary embedded in a note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteSeller {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// A sellable study-summary document.
///
/// `file_url` is only present for the seller and for buyers who purchased
/// the note; everyone else gets `preview_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub university: String,
    pub course: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    pub seller: NoteSeller,
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub ratings_count: u32,
    #[serde(default)]
    pub sales_count: u32,
    #[serde(default)]
    pub is_purchased: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create a listing (`POST /notes`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub university: String,
    pub course: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Partial listing update (`PATCH /notes/{id}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

/// Listing order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NoteSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    TopRated,
    BestSelling,
}

impl NoteSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteSort::Newest => "newest",
            NoteSort::PriceAsc => "price-asc",
            NoteSort::PriceDesc => "price-desc",
            NoteSort::TopRated => "top-rated",
            NoteSort::BestSelling => "best-selling",
        }
    }
}

/// Search filters for the public catalogue. Empty filters list everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: NoteSort,
}

impl NoteFilters {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.university.is_none()
            && self.course.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.sort == NoteSort::Newest
    }
}
