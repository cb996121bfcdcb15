//! # NoteMarket Client SDK - Library Root
//!
//! Client for a marketplace where university students buy and sell study
//! notes. The crate talks to the REST backend, caches reads, and keeps a
//! socket open for pushed notifications.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  queries    - Per-domain handles (notes, sales, ...)    │
//! │      │  reads ──▶ cache (stale 1 min, gc 5 min, retry)  │
//! │      │  writes ─▶ mutate ─▶ invalidate keys by prefix   │
//! │      ▼                                                  │
//! │  services   - MarketplaceApi over reqwest               │
//! │  realtime   - Socket.IO channel ─▶ cache invalidation   │
//! │  session    - Injected token and current user           │
//! │  events     - Toasts, navigation, notification cue      │
//! └────────────────────────────────────────────────────────┘
//!          │ HTTP                           │ WebSocket
//!          ▼                                ▼
//! ┌─────────────────┐          ┌─────────────────────────┐
//! │  REST backend   │          │  /notifications socket  │
//! └─────────────────┘          └─────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - **cache**: Keyed read-through cache with prefix invalidation
//! - **config**: [`ClientConfig`] from environment variables
//! - **core**: [`ApiError`], [`ErrorKind`], the [`MarketplaceApi`] trait
//! - **debug**: Logging setup and trace ids
//! - **events**: [`ClientEvent`] bus for the embedding application
//! - **forms**: Form state with per-field validation errors
//! - **queries**: [`Marketplace`] and its query handles
//! - **realtime**: Notification socket and its connection state machine
//! - **services**: HTTP implementation of [`MarketplaceApi`]
//! - **session**: [`Session`] shared by HTTP and socket
//! - **utils**: Input validation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notemarket::{ClientConfig, Marketplace};
//! use shared::LoginRequest;
//!
//! # async fn run() -> notemarket::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let market = Marketplace::new(&config)?;
//!
//! market
//!     .auth()
//!     .login(LoginRequest {
//!         email: "ada@uni.edu".into(),
//!         password: "Secret123".into(),
//!     })
//!     .await?;
//!
//! let channel = market.connect_notifications(&config);
//! let unread = market.notifications().unread_count().await?;
//! println!("{unread} unread");
//! channel.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod debug;
pub mod events;
pub mod forms;
pub mod queries;
pub mod realtime;
pub mod services;
pub mod session;
pub mod utils;

// Most frequently used types
pub use cache::{CacheOptions, QueryCache, QueryKey};
pub use config::{ClientConfig, Environment};
pub use self::core::{ApiError, ErrorKind, MarketplaceApi, Result};
pub use events::{ClientEvent, EventBus};
pub use queries::Marketplace;
pub use realtime::{ConnectionState, NotificationChannel, RealtimeStatus};
pub use services::ApiClient;
pub use session::Session;
