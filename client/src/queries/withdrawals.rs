//! Payout requests. Every change moves the available balance, so the
//! dashboard is invalidated alongside the list.

use shared::{CreateWithdrawalRequest, Paginated, UpdateWithdrawalRequest, Withdrawal};

use super::pager::Pager;
use super::{keys, QueryContext};
use crate::cache::QueryKey;
use crate::core::Result;

pub struct WithdrawalsQueries {
    ctx: QueryContext,
    pager: Pager,
}

impl WithdrawalsQueries {
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

    pub async fn list(&self) -> Result<Paginated<Withdrawal>> {
        let page = self.pager.query();
        let api = &self.ctx.api;
        self.ctx
            .cache
            .fetch(keys::withdrawals_page(page), || api.withdrawals(page))
            .await
    }

    pub async fn create(&self, request: CreateWithdrawalRequest) -> Result<Withdrawal> {
        self.ctx
            .cache
            .mutate("create_withdrawal", &stale_keys(), self.ctx.api.create_withdrawal(request))
            .await
    }

    pub async fn update(&self, id: &str, request: UpdateWithdrawalRequest) -> Result<Withdrawal> {
        self.ctx
            .cache
            .mutate("update_withdrawal", &stale_keys(), self.ctx.api.update_withdrawal(id, request))
            .await
    }

    pub async fn cancel(&self, id: &str) -> Result<()> {
        self.ctx
            .cache
            .mutate("cancel_withdrawal", &stale_keys(), self.ctx.api.cancel_withdrawal(id))
            .await
    }
}

fn stale_keys() -> [QueryKey; 2] {
    [keys::withdrawals(), keys::dashboard()]
}
