//! Session lifecycle and the signed-in user's profile.

use shared::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    UpdateProfileRequest, User,
};

use super::{keys, QueryContext};
use crate::core::Result;

pub struct AuthQueries {
    ctx: QueryContext,
}

impl AuthQueries {
    pub(crate) fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Sign in and store the token in the session. Cached reads of any
    /// previous user are dropped.
    pub async fn login(&self, request: LoginRequest) -> Result<User> {
        let auth = self
            .ctx
            .cache
            .mutate("login", &[], self.ctx.api.login(request))
            .await?;
        self.ctx.cache.clear();
        self.ctx.session.sign_in(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let auth = self
            .ctx
            .cache
            .mutate("register", &[], self.ctx.api.register(request))
            .await?;
        self.ctx.cache.clear();
        self.ctx.session.sign_in(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    /// Current user, cached under `["me"]`.
    pub async fn me(&self) -> Result<User> {
        let api = &self.ctx.api;
        let user = self.ctx.cache.fetch(keys::me(), || api.me()).await?;
        self.ctx.session.set_user(user.clone());
        Ok(user)
    }

    pub async fn forgot_password(&self, email: impl Into<String>) -> Result<MessageResponse> {
        let request = ForgotPasswordRequest { email: email.into() };
        self.ctx
            .cache
            .mutate("forgot_password", &[], self.ctx.api.forgot_password(request))
            .await
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<MessageResponse> {
        self.ctx
            .cache
            .mutate("reset_password", &[], self.ctx.api.reset_password(request))
            .await
    }

    pub async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User> {
        let mut stale = vec![keys::me()];
        if let Some(user) = self.ctx.session.user() {
            stale.push(keys::user(&user.id));
        }
        let user = self
            .ctx
            .cache
            .mutate("update_profile", &stale, self.ctx.api.update_profile(request))
            .await?;
        self.ctx.session.set_user(user.clone());
        Ok(user)
    }

    /// Forget the token and every cached read.
    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.ctx.session.clear();
        self.ctx.cache.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.session.is_authenticated()
    }
}
