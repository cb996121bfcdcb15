//! # Service Trait
//!
//! Every backend operation the query layer needs, behind one object-safe
//! trait so tests can swap the HTTP client for an in-memory fake.

use async_trait::async_trait;
use shared::{
    AuthResponse, CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, CreateNoteRequest,
    CreateRatingRequest, CreateWithdrawalRequest, CustomerRating, DashboardStats,
    ForgotPasswordRequest, LoginRequest, MessageResponse, Note, NoteFilters, Notification,
    PageQuery, Paginated, ProfitPoint, ProfitRange, ProfitSummary, PurchaseConfirmation,
    RegisterRequest, ResetPasswordRequest, Sale, UnreadCount, UpdateNoteRequest,
    UpdateProfileRequest, UpdateWithdrawalRequest, User, Withdrawal,
};

use super::error::Result;

/// Backend operations of the marketplace.
///
/// Implementations are stateless apart from the session they read the bearer
/// token from.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    // Auth
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse>;
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse>;
    async fn me(&self) -> Result<User>;
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<MessageResponse>;
    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<MessageResponse>;

    // Users
    async fn user_profile(&self, id: &str) -> Result<User>;
    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User>;

    // Notes
    async fn list_notes(&self, page: PageQuery, filters: &NoteFilters) -> Result<Paginated<Note>>;
    async fn get_note(&self, id: &str) -> Result<Note>;
    async fn my_notes(&self, page: PageQuery) -> Result<Paginated<Note>>;
    async fn purchased_notes(&self, page: PageQuery) -> Result<Paginated<Note>>;
    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note>;
    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note>;
    async fn delete_note(&self, id: &str) -> Result<()>;

    // Dashboard
    async fn sales(&self, page: PageQuery) -> Result<Paginated<Sale>>;
    async fn dashboard_stats(&self) -> Result<DashboardStats>;

    // Withdrawals
    async fn withdrawals(&self, page: PageQuery) -> Result<Paginated<Withdrawal>>;
    async fn create_withdrawal(&self, request: CreateWithdrawalRequest) -> Result<Withdrawal>;
    async fn update_withdrawal(&self, id: &str, request: UpdateWithdrawalRequest) -> Result<Withdrawal>;
    async fn cancel_withdrawal(&self, id: &str) -> Result<()>;

    // Notifications
    async fn notifications(&self, page: PageQuery) -> Result<Paginated<Notification>>;
    async fn unread_count(&self) -> Result<UnreadCount>;
    async fn mark_notification_read(&self, id: &str) -> Result<()>;
    async fn mark_all_notifications_read(&self) -> Result<()>;
    async fn clear_notifications(&self) -> Result<()>;

    // Customer ratings
    async fn note_ratings(&self, note_id: &str) -> Result<Vec<CustomerRating>>;
    async fn create_rating(&self, request: CreateRatingRequest) -> Result<CustomerRating>;

    // Profits
    async fn profits(&self, range: ProfitRange) -> Result<Vec<ProfitPoint>>;
    async fn profit_summary(&self) -> Result<ProfitSummary>;

    // Payment
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession>;
    async fn confirm_payment(&self, request: ConfirmPaymentRequest) -> Result<PurchaseConfirmation>;
}
