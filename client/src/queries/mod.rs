//! # Query Handles
//!
//! Per-domain handles that compose cached reads and mutations over the
//! service layer. Reads go through the [`QueryCache`]; writes go through
//! [`QueryCache::mutate`] and name the keys they make stale. Nothing is
//! written to the cache optimistically.
//!
//! ```text
//! Marketplace ──auth()──────────▶ AuthQueries
//!   │  api: Arc<dyn MarketplaceApi>  notes()─▶ NotesQueries { pager, filters }
//!   │  cache: QueryCache              sales()─▶ SalesQueries { pager }
//!   │  session: Session               ...
//!   └  events: EventBus
//! ```
//!
//! ```rust,no_run
//! use notemarket::config::ClientConfig;
//! use notemarket::queries::Marketplace;
//!
//! # async fn demo() -> notemarket::core::Result<()> {
//! let market = Marketplace::new(&ClientConfig::default())?;
//! let mut notes = market.notes();
//! let first_page = notes.list().await?;
//! if notes.next_page(first_page.total_pages()) {
//!     let second_page = notes.list().await?;
//!     println!("{} notes on page 2", second_page.items.len());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod keys;
mod notes;
mod notifications;
mod pager;
mod payment;
mod profits;
mod ratings;
mod sales;
mod users;
mod withdrawals;

use std::sync::Arc;

pub use auth::AuthQueries;
pub use notes::{NotesQueries, NOTES_PAGE_SIZE};
pub use notifications::NotificationsQueries;
pub use pager::{Pager, DEFAULT_PAGE_SIZE};
pub use payment::{note_path, PaymentQueries};
pub use profits::ProfitsQueries;
pub use ratings::RatingsQueries;
pub use sales::SalesQueries;
pub use users::UsersQueries;
pub use withdrawals::WithdrawalsQueries;

use crate::cache::{CacheOptions, QueryCache};
use crate::config::ClientConfig;
use crate::core::{MarketplaceApi, Result};
use crate::events::EventBus;
use crate::realtime::NotificationChannel;
use crate::services::api::ApiClient;
use crate::session::Session;

/// Everything a handle needs; cheap to clone.
#[derive(Clone)]
pub(crate) struct QueryContext {
    pub(crate) api: Arc<dyn MarketplaceApi>,
    pub(crate) cache: QueryCache,
    pub(crate) session: Session,
    pub(crate) events: EventBus,
}

/// Entry point of the SDK: one API client, one cache, one session.
#[derive(Clone)]
pub struct Marketplace {
    ctx: QueryContext,
}

impl Marketplace {
    /// HTTP-backed marketplace with a fresh session and event bus.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let session = Session::new();
        let events = EventBus::new();
        let api = ApiClient::new(config, session.clone(), events.clone())?;
        Ok(Self::with_api(Arc::new(api), config.cache.clone(), session, events))
    }

    /// Marketplace over any [`MarketplaceApi`] implementation.
    pub fn with_api(
        api: Arc<dyn MarketplaceApi>,
        options: CacheOptions,
        session: Session,
        events: EventBus,
    ) -> Self {
        let cache = QueryCache::with_events(options, events.clone());
        Self {
            ctx: QueryContext {
                api,
                cache,
                session,
                events,
            },
        }
    }

    pub fn api(&self) -> &Arc<dyn MarketplaceApi> {
        &self.ctx.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.ctx.cache
    }

    pub fn session(&self) -> &Session {
        &self.ctx.session
    }

    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    pub fn auth(&self) -> AuthQueries {
        AuthQueries::new(self.ctx.clone())
    }

    pub fn users(&self) -> UsersQueries {
        UsersQueries::new(self.ctx.clone())
    }

    pub fn notes(&self) -> NotesQueries {
        NotesQueries::new(self.ctx.clone())
    }

    pub fn sales(&self) -> SalesQueries {
        SalesQueries::new(self.ctx.clone())
    }

    pub fn withdrawals(&self) -> WithdrawalsQueries {
        WithdrawalsQueries::new(self.ctx.clone())
    }

    pub fn notifications(&self) -> NotificationsQueries {
        NotificationsQueries::new(self.ctx.clone())
    }

    pub fn ratings(&self) -> RatingsQueries {
        RatingsQueries::new(self.ctx.clone())
    }

    pub fn profits(&self) -> ProfitsQueries {
        ProfitsQueries::new(self.ctx.clone())
    }

    pub fn payment(&self) -> PaymentQueries {
        PaymentQueries::new(self.ctx.clone())
    }

    /// Open the notification socket for the current session. Must be called
    /// inside a tokio runtime.
    pub fn connect_notifications(&self, config: &ClientConfig) -> NotificationChannel {
        NotificationChannel::spawn(
            config,
            self.ctx.session.clone(),
            self.ctx.cache.clone(),
            self.ctx.events.clone(),
        )
    }
}
