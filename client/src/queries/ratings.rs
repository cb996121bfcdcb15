//! Customer ratings of purchased notes.

use shared::{CreateRatingRequest, CustomerRating};

use super::{keys, QueryContext};
use crate::core::Result;

pub struct RatingsQueries {
    ctx: QueryContext,
}

impl RatingsQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    pub async fn for_note(&self, note_id: &str) -> Result<Vec<CustomerRating>> {
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::note_ratings(note_id), || api.note_ratings(note_id))
            .await
    }

    /// A new rating changes the note's average, so the note and the
    /// catalogue are refetched too.
    pub async fn rate(&self, request: CreateRatingRequest) -> Result<CustomerRating> {
        let stale = [
            keys::note_ratings(&request.note_id),
            keys::note(&request.note_id),
            keys::notes(),
        ];
        self.ctx
            .cache
            .mutate("create_rating", &stale, self.ctx.api.create_rating(request))
            .await
    }
}
