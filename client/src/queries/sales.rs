//! Seller dashboard: sales history and headline figures.

use shared::{DashboardStats, Paginated, Sale};

use super::pager::Pager;
use super::{keys, QueryContext};
use crate::core::Result;

pub struct SalesQueries {
    ctx: QueryContext,
    pager: Pager,
}

impl SalesQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self {
            ctx,
            pager: Pager::default(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    pub async fn list(&self) -> Result<Paginated<Sale>> {
        let page = self.pager.query();
        let api = &self.ctx.api;
        self.ctx.cache.fetch(keys::sales(page), || api.sales(page)).await
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::dashboard_stats(), || api.dashboard_stats())
            .await
    }
}
