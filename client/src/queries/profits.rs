//! Earnings charts.

use shared::{ProfitPoint, ProfitRange, ProfitSummary};

use super::{keys, QueryContext};
use crate::core::Result;

pub struct ProfitsQueries {
    ctx: QueryContext,
    range: ProfitRange,
}

impl ProfitsQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self {
            ctx,
            range: ProfitRange::default(),
        }
    }

    pub fn range(&self) -> ProfitRange {
        self.range
    }

    pub fn set_range(&mut self, range: ProfitRange) {
        self.range = range;
    }

    /// Series for the selected range.
    pub async fn series(&self) -> Result<Vec<ProfitPoint>> {
        let range = self.range;
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::profit_series(range), || api.profits(range))
            .await
    }

    pub async fn summary(&self) -> Result<ProfitSummary> {
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::profit_summary(), || api.profit_summary())
            .await
    }
}
