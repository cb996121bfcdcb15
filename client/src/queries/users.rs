//! Public user profiles.

use shared::User;

use super::{keys, QueryContext};
use crate::core::Result;

pub struct UsersQueries {
    ctx: QueryContext,
}

impl UsersQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    pub async fn profile(&self, id: &str) -> Result<User> {
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::user(id), || api.user_profile(id))
            .await
    }
}
