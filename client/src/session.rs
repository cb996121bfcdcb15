//! # Session Context
//!
//! The bearer token and the logged-in user, held in one handle that is
//! created by the application and passed explicitly to the [`ApiClient`]
//! and the notification channel. Clones share state.
//!
//! Every sign-in and sign-out bumps a generation counter published on a
//! `watch` channel, so long-lived consumers such as the notification socket
//! can follow the user that is currently signed in.
//!
//! [`ApiClient`]: crate::services::api::ApiClient

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use shared::User;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
    generation: Arc<watch::Sender<u64>>,
}

impl Default for Session {
    fn default() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Arc::default(),
            generation: Arc::new(generation),
        }
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session restored from a token kept by the application.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.inner.write().token = Some(token.into());
        session
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().token.is_some()
    }

    /// Store the result of a successful login or registration.
    pub fn sign_in(&self, token: String, user: User) {
        {
            let mut state = self.inner.write();
            state.token = Some(token);
            state.user = Some(user);
        }
        self.bump();
    }

    pub fn set_user(&self, user: User) {
        self.inner.write().user = Some(user);
    }

    pub fn clear(&self) {
        {
            let mut state = self.inner.write();
            state.token = None;
            state.user = None;
        }
        self.bump();
    }

    /// Receiver that wakes on every sign-in and sign-out after this call.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    fn bump(&self) {
        self.generation.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Expiry from the token's `exp` claim. `None` when there is no token or
    /// it is not a JWT carrying `exp`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.token()?;
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: JwtClaims = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(claims.exp?, 0)
    }

    /// A token whose expiry is unknown is treated as valid; the backend has
    /// the final word through 401.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}
