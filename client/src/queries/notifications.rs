//! Notification inbox. The realtime channel invalidates the same
//! `["notifications"]` prefix when the server pushes changes.

use shared::{Notification, Paginated};

use super::pager::Pager;
use super::{keys, QueryContext};
use crate::core::Result;

pub const NOTIFICATIONS_PAGE_SIZE: u32 = 20;

pub struct NotificationsQueries {
    ctx: QueryContext,
    pager: Pager,
}

impl NotificationsQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self {
            ctx,
            pager: Pager::new(NOTIFICATIONS_PAGE_SIZE),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    pub async fn list(&self) -> Result<Paginated<Notification>> {
        let page = self.pager.query();
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::notifications_page(page), || api.notifications(page))
            .await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let api = &self.ctx.api;
        let unread = self
            .ctx
            .cache
            .fetch(keys::unread_count(), || api.unread_count())
            .await?;
        Ok(unread.count)
    }

    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.ctx
            .cache
            .mutate(
                "mark_notification_read",
                &[keys::notifications()],
                self.ctx.api.mark_notification_read(id),
            )
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.ctx
            .cache
            .mutate(
                "mark_all_notifications_read",
                &[keys::notifications()],
                self.ctx.api.mark_all_notifications_read(),
            )
            .await
    }

    pub async fn clear(&self) -> Result<()> {
        self.ctx
            .cache
            .mutate(
                "clear_notifications",
                &[keys::notifications()],
                self.ctx.api.clear_notifications(),
            )
            .await
    }
}
