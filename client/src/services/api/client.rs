//! # API Client
//!
//! Main HTTP client for backend API communication.

use std::time::Instant;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    AuthResponse, CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, CreateNoteRequest,
    CreateRatingRequest, CreateWithdrawalRequest, CustomerRating, DashboardStats, ErrorResponse,
    ForgotPasswordRequest, LoginRequest, MessageResponse, Note, NoteFilters, Notification,
    PageQuery, Paginated, ProfitPoint, ProfitRange, ProfitSummary, PurchaseConfirmation,
    RegisterRequest, ResetPasswordRequest, Sale, UnreadCount, UpdateNoteRequest,
    UpdateProfileRequest, UpdateWithdrawalRequest, User, Withdrawal,
};
use uuid::Uuid;

use super::{auth, dashboard, notes, notifications, payment, profits, ratings, users, withdrawals};
use crate::config::ClientConfig;
use crate::debug::current_trace_id;
use crate::core::error::{ApiError, Result};
use crate::core::service::MarketplaceApi;
use crate::events::{ClientEvent, EventBus};
use crate::session::Session;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the trace id of the enclosing user action, if any.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// HTTP client for the marketplace backend.
///
/// Holds one connection pool, the base URL, and the injected [`Session`]
/// whose token is attached to every request. Cloning is cheap and shares the
/// pool and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
    session: Session,
    events: EventBus,
}

/// Endpoints that check submitted credentials. A 401 from these means the
/// credentials were wrong, not that the held session expired.
const CREDENTIAL_PATHS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// A request that has been stamped with its correlation id.
pub(crate) struct PreparedRequest {
    pub(crate) builder: RequestBuilder,
    pub(crate) request_id: String,
    /// Whether a 401 reply ends the current session
    pub(crate) expires_session: bool,
}

impl PreparedRequest {
    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    pub(crate) fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.builder = self.builder.query(query);
        self
    }
}

impl ApiClient {
    /// Build the client from configuration.
    ///
    /// The timeout comes from `config.http_timeout`; `None` disables it.
    pub fn new(config: &ClientConfig, session: Session, events: EventBus) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("notemarket/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with the bearer token and a fresh request id.
    pub(crate) fn request(&self, method: Method, path: &str) -> PreparedRequest {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(trace_id) = current_trace_id() {
            builder = builder.header(TRACE_ID_HEADER, trace_id);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        PreparedRequest {
            builder,
            request_id,
            expires_session: !CREDENTIAL_PATHS.contains(&path),
        }
    }

    /// Send and decode a JSON body.
    pub(crate) async fn execute<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read response body");
            ApiError::from(e)
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(error = %e, "Response parse error");
            ApiError::from(e)
        })
    }

    /// Send and discard the body (204 and `{ "message": .. }` replies).
    pub(crate) async fn execute_empty(&self, request: PreparedRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: PreparedRequest) -> Result<Response> {
        let PreparedRequest {
            builder,
            request_id,
            expires_session,
        } = request;
        let start = Instant::now();

        let response = builder.send().await.map_err(|e| {
            tracing::error!(
                request_id = %request_id,
                trace_id = ?current_trace_id(),
                error = %e,
                "Network error"
            );
            ApiError::from(e)
        })?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                duration_ms,
                "Request succeeded"
            );
            return Ok(response);
        }

        // Error bodies are best effort; a proxy may answer with HTML.
        let body = response.json::<ErrorResponse>().await.ok();
        let error = ApiError::from_status(status, body);

        tracing::warn!(
            request_id = %request_id,
            trace_id = ?current_trace_id(),
            status = status.as_u16(),
            error = %error,
            duration_ms,
            "Request failed"
        );

        if status == StatusCode::UNAUTHORIZED && expires_session && self.session.is_authenticated() {
            self.session.clear();
            self.events.emit(ClientEvent::SessionExpired);
        }

        Err(error)
    }
}

#[async_trait::async_trait]
impl MarketplaceApi for ApiClient {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        auth::login(self, request).await
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        auth::register(self, request).await
    }

    async fn me(&self) -> Result<User> {
        auth::me(self).await
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<MessageResponse> {
        auth::forgot_password(self, request).await
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<MessageResponse> {
        auth::reset_password(self, request).await
    }

    async fn user_profile(&self, id: &str) -> Result<User> {
        users::user_profile(self, id).await
    }

    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User> {
        users::update_profile(self, request).await
    }

    async fn list_notes(&self, page: PageQuery, filters: &NoteFilters) -> Result<Paginated<Note>> {
        notes::list_notes(self, page, filters).await
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        notes::get_note(self, id).await
    }

    async fn my_notes(&self, page: PageQuery) -> Result<Paginated<Note>> {
        notes::my_notes(self, page).await
    }

    async fn purchased_notes(&self, page: PageQuery) -> Result<Paginated<Note>> {
        notes::purchased_notes(self, page).await
    }

    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note> {
        notes::create_note(self, request).await
    }

    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note> {
        notes::update_note(self, id, request).await
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        notes::delete_note(self, id).await
    }

    async fn sales(&self, page: PageQuery) -> Result<Paginated<Sale>> {
        dashboard::sales(self, page).await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        dashboard::dashboard_stats(self).await
    }

    async fn withdrawals(&self, page: PageQuery) -> Result<Paginated<Withdrawal>> {
        withdrawals::withdrawals(self, page).await
    }

    async fn create_withdrawal(&self, request: CreateWithdrawalRequest) -> Result<Withdrawal> {
        withdrawals::create_withdrawal(self, request).await
    }

    async fn update_withdrawal(&self, id: &str, request: UpdateWithdrawalRequest) -> Result<Withdrawal> {
        withdrawals::update_withdrawal(self, id, request).await
    }

    async fn cancel_withdrawal(&self, id: &str) -> Result<()> {
        withdrawals::cancel_withdrawal(self, id).await
    }

    async fn notifications(&self, page: PageQuery) -> Result<Paginated<Notification>> {
        notifications::notifications(self, page).await
    }

    async fn unread_count(&self) -> Result<UnreadCount> {
        notifications::unread_count(self).await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        notifications::mark_notification_read(self, id).await
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        notifications::mark_all_notifications_read(self).await
    }

    async fn clear_notifications(&self) -> Result<()> {
        notifications::clear_notifications(self).await
    }

    async fn note_ratings(&self, note_id: &str) -> Result<Vec<CustomerRating>> {
        ratings::note_ratings(self, note_id).await
    }

    async fn create_rating(&self, request: CreateRatingRequest) -> Result<CustomerRating> {
        ratings::create_rating(self, request).await
    }

    async fn profits(&self, range: ProfitRange) -> Result<Vec<ProfitPoint>> {
        profits::profits(self, range).await
    }

    async fn profit_summary(&self) -> Result<ProfitSummary> {
        profits::profit_summary(self).await
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        payment::checkout(self, request).await
    }

    async fn confirm_payment(&self, request: ConfirmPaymentRequest) -> Result<PurchaseConfirmation> {
        payment::confirm_payment(self, request).await
    }
}
