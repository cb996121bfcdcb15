//! # Query Layer Tests
//!
//! Query handles over an in-memory [`MarketplaceApi`], checking what is
//! cached, what is invalidated and which client events are emitted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use notemarket::queries::keys;
use notemarket::{ApiError, CacheOptions, ClientEvent, ErrorKind, EventBus, Marketplace, MarketplaceApi, Result, Session};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use shared::{
    AuthResponse, CheckoutRequest, CheckoutSession, ConfirmPaymentRequest, CreateNoteRequest,
    CreateRatingRequest, CreateWithdrawalRequest, CustomerRating, DashboardStats, ForgotPasswordRequest,
    LoginRequest, MessageResponse, Note, NoteFilters, NoteSeller, Notification, PageQuery, Paginated,
    ProfitPoint, ProfitRange, ProfitSummary, PurchaseConfirmation, RatingAuthor, RegisterRequest,
    ResetPasswordRequest, Sale, UnreadCount, UpdateNoteRequest, UpdateProfileRequest, UpdateWithdrawalRequest,
    User, UserRole, Withdrawal, WithdrawalStatus,
};

// ========== Fake Backend ==========

#[derive(Default)]
struct FakeApi {
    notes: Mutex<Vec<Note>>,
    calls: Mutex<HashMap<&'static str, u32>>,
    /// Every write answers 500
    fail_writes: AtomicBool,
    /// Number of reads that fail with a 503 before reads succeed again
    flaky_reads: AtomicU32,
    unread: AtomicU64,
    /// The signed-in user as the backend sees it
    profile: Mutex<Option<User>>,
}

impl FakeApi {
    fn with_notes(ids: &[&str]) -> Self {
        let api = Self::default();
        *api.notes.lock() = ids.iter().map(|id| note(id)).collect();
        api
    }

    fn hit(&self, op: &'static str) {
        *self.calls.lock().entry(op).or_default() += 1;
    }

    fn calls(&self, op: &'static str) -> u32 {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    fn read(&self, op: &'static str) -> Result<()> {
        self.hit(op);
        let flaky = self.flaky_reads.load(Ordering::SeqCst);
        if flaky > 0 {
            self.flaky_reads.store(flaky - 1, Ordering::SeqCst);
            return Err(ApiError::Server {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn write(&self, op: &'static str) -> Result<()> {
        self.hit(op);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

fn note(id: &str) -> Note {
    Note {
        id: id.to_string(),
        title: format!("Summary {id}"),
        description: "Lecture notes".to_string(),
        price: dec!(4.99),
        university: "ETH".to_string(),
        course: "Analysis I".to_string(),
        year: Some(2024),
        page_count: Some(30),
        preview_url: None,
        file_url: None,
        seller: NoteSeller {
            id: "s1".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        },
        average_rating: None,
        ratings_count: 0,
        sales_count: 0,
        is_purchased: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

const PASSWORD: &str = "Secret123";

fn user(id: &str, first_name: &str) -> User {
    User {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: "Lovelace".to_string(),
        email: format!("{id}@uni.edu"),
        university: Some("ETH".to_string()),
        avatar_url: None,
        role: UserRole::Student,
        balance: dec!(11.98),
        created_at: Utc::now(),
    }
}

fn withdrawal(id: &str, iban: &str) -> Withdrawal {
    Withdrawal {
        id: id.to_string(),
        amount: dec!(10),
        iban: iban.to_string(),
        status: WithdrawalStatus::Pending,
        created_at: Utc::now(),
        processed_at: None,
    }
}

fn unused<T>() -> Result<T> {
    Err(ApiError::NotFound("not served by the fake backend".to_string()))
}

#[async_trait]
impl MarketplaceApi for FakeApi {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        self.hit("login");
        if request.password != PASSWORD {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
        let id = request.email.trim_end_matches("@uni.edu");
        let user = user(id, "Ada");
        *self.profile.lock() = Some(user.clone());
        Ok(AuthResponse {
            access_token: format!("tok-{id}"),
            user,
        })
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        self.write("register")?;
        let id = request.email.trim_end_matches("@uni.edu");
        let user = user(id, &request.first_name);
        *self.profile.lock() = Some(user.clone());
        Ok(AuthResponse {
            access_token: format!("tok-{id}"),
            user,
        })
    }

    async fn me(&self) -> Result<User> {
        self.read("me")?;
        self.profile
            .lock()
            .clone()
            .ok_or_else(|| ApiError::Unauthorized(String::new()))
    }

    async fn forgot_password(&self, _request: ForgotPasswordRequest) -> Result<MessageResponse> {
        unused()
    }

    async fn reset_password(&self, _request: ResetPasswordRequest) -> Result<MessageResponse> {
        unused()
    }

    async fn user_profile(&self, id: &str) -> Result<User> {
        self.read("user_profile")?;
        self.profile
            .lock()
            .clone()
            .filter(|u| u.id == id)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User> {
        self.write("update_profile")?;
        let mut profile = self.profile.lock();
        let user = profile
            .as_mut()
            .ok_or_else(|| ApiError::Unauthorized(String::new()))?;
        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        Ok(user.clone())
    }

    async fn list_notes(&self, page: PageQuery, _filters: &NoteFilters) -> Result<Paginated<Note>> {
        self.read("list_notes")?;
        let items = self.notes.lock().clone();
        Ok(Paginated {
            total: items.len() as u64,
            items,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        self.read("get_note")?;
        self.notes
            .lock()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
    }

    async fn my_notes(&self, _page: PageQuery) -> Result<Paginated<Note>> {
        unused()
    }

    async fn purchased_notes(&self, _page: PageQuery) -> Result<Paginated<Note>> {
        unused()
    }

    async fn create_note(&self, _request: CreateNoteRequest) -> Result<Note> {
        unused()
    }

    async fn update_note(&self, _id: &str, _request: UpdateNoteRequest) -> Result<Note> {
        unused()
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.write("delete_note")?;
        self.notes.lock().retain(|n| n.id != id);
        Ok(())
    }

    async fn sales(&self, _page: PageQuery) -> Result<Paginated<Sale>> {
        unused()
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.read("dashboard_stats")?;
        Ok(DashboardStats {
            total_sales: 3,
            total_revenue: dec!(14.97),
            available_balance: dec!(11.98),
            published_notes: self.notes.lock().len() as u64,
        })
    }

    async fn withdrawals(&self, page: PageQuery) -> Result<Paginated<Withdrawal>> {
        self.read("withdrawals")?;
        Ok(Paginated {
            items: vec![withdrawal("w1", "DE89370400440532013000")],
            total: 1,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn create_withdrawal(&self, request: CreateWithdrawalRequest) -> Result<Withdrawal> {
        self.write("create_withdrawal")?;
        Ok(withdrawal("w2", &request.iban))
    }

    async fn update_withdrawal(&self, id: &str, request: UpdateWithdrawalRequest) -> Result<Withdrawal> {
        self.write("update_withdrawal")?;
        Ok(withdrawal(id, &request.iban))
    }

    async fn cancel_withdrawal(&self, _id: &str) -> Result<()> {
        self.write("cancel_withdrawal")
    }

    async fn notifications(&self, _page: PageQuery) -> Result<Paginated<Notification>> {
        unused()
    }

    async fn unread_count(&self) -> Result<UnreadCount> {
        self.read("unread_count")?;
        Ok(UnreadCount {
            count: self.unread.load(Ordering::SeqCst),
        })
    }

    async fn mark_notification_read(&self, _id: &str) -> Result<()> {
        unused()
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        self.write("mark_all_notifications_read")?;
        self.unread.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_notifications(&self) -> Result<()> {
        unused()
    }

    async fn note_ratings(&self, _note_id: &str) -> Result<Vec<CustomerRating>> {
        self.read("note_ratings")?;
        Ok(Vec::new())
    }

    async fn create_rating(&self, request: CreateRatingRequest) -> Result<CustomerRating> {
        self.write("create_rating")?;
        Ok(CustomerRating {
            id: "r1".to_string(),
            note_id: request.note_id,
            author: RatingAuthor {
                id: "u1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            },
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        })
    }

    async fn profits(&self, _range: ProfitRange) -> Result<Vec<ProfitPoint>> {
        unused()
    }

    async fn profit_summary(&self) -> Result<ProfitSummary> {
        unused()
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        self.write("checkout")?;
        Ok(CheckoutSession {
            session_id: format!("cs_{}", request.note_id),
            checkout_url: "https://pay.example.com/cs".to_string(),
        })
    }

    async fn confirm_payment(&self, request: ConfirmPaymentRequest) -> Result<PurchaseConfirmation> {
        self.write("confirm_payment")?;
        let note_id = request.session_id.trim_start_matches("cs_").to_string();
        Ok(PurchaseConfirmation {
            note_id,
            sale_id: "sale-1".to_string(),
        })
    }
}

fn market_over(api: Arc<FakeApi>) -> Marketplace {
    let options = CacheOptions {
        retry_delay: Duration::from_millis(5),
        ..CacheOptions::default()
    };
    Marketplace::with_api(api, options, Session::with_token("t"), EventBus::new())
}

fn ids(page: &Paginated<Note>) -> Vec<&str> {
    page.items.iter().map(|n| n.id.as_str()).collect()
}

// ========== Reads ==========

#[tokio::test]
async fn test_fresh_reads_are_served_from_cache() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1", "n2"]));
    let market = market_over(api.clone());
    let notes = market.notes();

    // Act
    let first = notes.list().await.unwrap();
    let second = notes.list().await.unwrap();

    // Assert
    assert_eq!(first, second);
    assert_eq!(api.calls("list_notes"), 1);
}

#[tokio::test]
async fn test_retryable_failure_is_retried_once() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    api.flaky_reads.store(1, Ordering::SeqCst);
    let market = market_over(api.clone());

    // Act
    let page = market.notes().list().await.unwrap();

    // Assert
    assert_eq!(ids(&page), ["n1"]);
    assert_eq!(api.calls("list_notes"), 2);
}

#[tokio::test]
async fn test_second_retryable_failure_is_returned() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    api.flaky_reads.store(2, Ordering::SeqCst);
    let market = market_over(api.clone());

    // Act
    let err = market.notes().list().await.unwrap_err();

    // Assert
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(api.calls("list_notes"), 2);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());

    // Act
    let err = market.notes().detail("missing").await.unwrap_err();

    // Assert
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(api.calls("get_note"), 1);
}

// ========== Mutations ==========

#[tokio::test]
async fn test_delete_invalidates_and_refetch_omits_note() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1", "n2", "n3"]));
    let market = market_over(api.clone());
    let notes = market.notes();
    let before = notes.list().await.unwrap();
    let stats_before = market.sales().stats().await.unwrap();
    market.events().drain();

    // Act
    notes.delete("n2").await.unwrap();
    let after = notes.list().await.unwrap();
    let stats_after = market.sales().stats().await.unwrap();

    // Assert
    assert_eq!(ids(&before), ["n1", "n2", "n3"]);
    assert_eq!(ids(&after), ["n1", "n3"]);
    assert_eq!(api.calls("list_notes"), 2);
    assert_eq!(stats_before.published_notes, 3);
    assert_eq!(stats_after.published_notes, 2);

    let invalidated: Vec<_> = market
        .events()
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            ClientEvent::Invalidated(keys) => Some(keys),
            _ => None,
        })
        .flatten()
        .collect();
    assert!(invalidated.contains(&keys::notes()));
    assert!(invalidated.contains(&keys::note("n2")));
    assert!(invalidated.contains(&keys::dashboard()));
}

#[tokio::test]
async fn test_failed_delete_leaves_cache_intact() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1", "n2"]));
    let market = market_over(api.clone());
    let notes = market.notes();
    notes.list().await.unwrap();
    market.events().drain();
    api.fail_writes.store(true, Ordering::SeqCst);

    // Act
    let err = notes.delete("n2").await.unwrap_err();
    let page = notes.list().await.unwrap();

    // Assert
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(ids(&page), ["n1", "n2"]);
    assert_eq!(api.calls("list_notes"), 1);
    let list_key = keys::notes_list(notes.pager().query(), notes.filters());
    assert!(market.cache().is_fresh(&list_key));

    let events = market.events().drain();
    assert!(events.iter().any(|e| matches!(
        e,
        ClientEvent::MutationFailed { operation: "delete_note", .. }
    )));
    assert!(!events.iter().any(|e| matches!(e, ClientEvent::Invalidated(_))));
}

#[tokio::test]
async fn test_mark_all_read_refreshes_unread_count() {
    // Arrange
    let api = Arc::new(FakeApi::default());
    api.unread.store(4, Ordering::SeqCst);
    let market = market_over(api.clone());
    let notifications = market.notifications();
    assert_eq!(notifications.unread_count().await.unwrap(), 4);

    // Act
    notifications.mark_all_read().await.unwrap();
    let unread = notifications.unread_count().await.unwrap();

    // Assert
    assert_eq!(unread, 0);
    assert_eq!(api.calls("unread_count"), 2);
}

// ========== Purchase Flow ==========

#[tokio::test]
async fn test_checkout_invalidates_nothing() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    market.notes().list().await.unwrap();
    market.events().drain();

    // Act
    let session = market.payment().checkout("n1").await.unwrap();

    // Assert
    assert_eq!(session.session_id, "cs_n1");
    assert!(market.events().drain().is_empty());
    market.notes().list().await.unwrap();
    assert_eq!(api.calls("list_notes"), 1);
}

#[tokio::test]
async fn test_confirm_purchase_refreshes_note_and_navigates() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    market.notes().detail("n1").await.unwrap();
    market.events().drain();

    // Act
    let confirmation = market.payment().confirm("cs_n1").await.unwrap();
    market.notes().detail("n1").await.unwrap();

    // Assert
    assert_eq!(confirmation.note_id, "n1");
    assert_eq!(api.calls("get_note"), 2);
    let events = market.events().drain();
    let invalidations: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Invalidated(keys) => Some(keys.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        invalidations,
        [vec![keys::notes(), keys::note("n1"), keys::sales_root(), keys::dashboard()]]
    );
    let navigated: Vec<_> = events
        .into_iter()
        .filter_map(|e| match e {
            ClientEvent::Navigate { path } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(navigated, ["/notes/n1"]);
}

#[tokio::test]
async fn test_failed_confirmation_does_not_navigate() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    api.fail_writes.store(true, Ordering::SeqCst);
    let market = market_over(api.clone());

    // Act
    let result = market.payment().confirm("cs_n1").await;

    // Assert
    assert!(result.is_err());
    assert!(!market
        .events()
        .drain()
        .iter()
        .any(|e| matches!(e, ClientEvent::Navigate { .. })));
}

// ========== Session ==========

fn login_as(id: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: format!("{id}@uni.edu"),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_drops_previous_users_reads() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    market.notes().list().await.unwrap();
    market.sales().stats().await.unwrap();
    assert!(!market.cache().is_empty());

    // Act
    let user = market.auth().login(login_as("bob", PASSWORD)).await.unwrap();

    // Assert
    assert_eq!(user.id, "bob");
    assert!(market.cache().is_empty());
    assert_eq!(market.session().token().as_deref(), Some("tok-bob"));
    assert_eq!(market.session().user().map(|u| u.id), Some("bob".to_string()));
    market.notes().list().await.unwrap();
    assert_eq!(api.calls("list_notes"), 2);
}

#[tokio::test]
async fn test_register_drops_previous_users_reads() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    market.sales().stats().await.unwrap();

    // Act
    let user = market
        .auth()
        .register(RegisterRequest {
            first_name: "Carol".to_string(),
            last_name: "Shaw".to_string(),
            email: "carol@uni.edu".to_string(),
            password: PASSWORD.to_string(),
            university: None,
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(user.first_name, "Carol");
    assert!(market.cache().is_empty());
    assert_eq!(market.session().token().as_deref(), Some("tok-carol"));
    market.sales().stats().await.unwrap();
    assert_eq!(api.calls("dashboard_stats"), 2);
}

#[tokio::test]
async fn test_failed_login_reports_backend_message_and_keeps_state() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    let notes = market.notes();
    notes.list().await.unwrap();
    market.events().drain();

    // Act
    let err = market.auth().login(login_as("bob", "wrong")).await.unwrap_err();

    // Assert
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(market.session().token().as_deref(), Some("t"));
    let list_key = keys::notes_list(notes.pager().query(), notes.filters());
    assert!(market.cache().is_fresh(&list_key));

    let events = market.events().drain();
    assert!(events.iter().any(|e| matches!(
        e,
        ClientEvent::MutationFailed { operation: "login", message } if message == "Invalid credentials"
    )));
    assert!(!events.iter().any(|e| matches!(e, ClientEvent::SessionExpired)));
}

#[tokio::test]
async fn test_logout_clears_session_and_cache() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    market.auth().login(login_as("bob", PASSWORD)).await.unwrap();
    market.notes().list().await.unwrap();
    market.auth().me().await.unwrap();
    assert!(market.auth().is_authenticated());

    // Act
    market.auth().logout();

    // Assert
    assert!(!market.auth().is_authenticated());
    assert_eq!(market.session().token(), None);
    assert_eq!(market.session().user(), None);
    assert!(market.cache().is_empty());
    assert!(!market.cache().contains(&keys::me()));
}

#[tokio::test]
async fn test_profile_update_refreshes_me_and_public_profile() {
    // Arrange
    let api = Arc::new(FakeApi::default());
    let market = market_over(api.clone());
    market.auth().login(login_as("u1", PASSWORD)).await.unwrap();
    market.auth().me().await.unwrap();
    market.users().profile("u1").await.unwrap();
    market.sales().stats().await.unwrap();
    market.events().drain();

    // Act
    let updated = market
        .auth()
        .update_profile(UpdateProfileRequest {
            first_name: Some("Augusta".to_string()),
            ..UpdateProfileRequest::default()
        })
        .await
        .unwrap();
    let me = market.auth().me().await.unwrap();
    let public = market.users().profile("u1").await.unwrap();
    market.sales().stats().await.unwrap();

    // Assert
    assert_eq!(updated.first_name, "Augusta");
    assert_eq!(me.first_name, "Augusta");
    assert_eq!(public.first_name, "Augusta");
    assert_eq!(api.calls("me"), 2);
    assert_eq!(api.calls("user_profile"), 2);
    assert_eq!(api.calls("dashboard_stats"), 1);
    assert_eq!(market.session().user().map(|u| u.first_name), Some("Augusta".to_string()));
    assert!(market.events().drain().iter().any(|e| matches!(
        e,
        ClientEvent::Invalidated(keys) if keys == &vec![keys::me(), keys::user("u1")]
    )));
}

// ========== Withdrawals and Ratings ==========

#[tokio::test]
async fn test_withdrawal_changes_refresh_list_and_dashboard() {
    // Arrange
    let api = Arc::new(FakeApi::default());
    let market = market_over(api.clone());
    let withdrawals = market.withdrawals();
    let stats = market.sales();
    withdrawals.list().await.unwrap();
    stats.stats().await.unwrap();

    // Act
    withdrawals
        .create(CreateWithdrawalRequest {
            amount: dec!(10),
            iban: "DE89370400440532013000".to_string(),
        })
        .await
        .unwrap();
    withdrawals.list().await.unwrap();
    stats.stats().await.unwrap();

    withdrawals
        .update(
            "w2",
            UpdateWithdrawalRequest {
                iban: "GB82WEST12345698765432".to_string(),
            },
        )
        .await
        .unwrap();
    withdrawals.list().await.unwrap();
    stats.stats().await.unwrap();

    withdrawals.cancel("w2").await.unwrap();
    withdrawals.list().await.unwrap();
    stats.stats().await.unwrap();

    // Assert
    assert_eq!(api.calls("withdrawals"), 4);
    assert_eq!(api.calls("dashboard_stats"), 4);
    let invalidations: Vec<_> = market
        .events()
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            ClientEvent::Invalidated(keys) => Some(keys),
            _ => None,
        })
        .collect();
    assert_eq!(invalidations.len(), 3);
    assert!(invalidations
        .iter()
        .all(|keys| keys == &vec![keys::withdrawals(), keys::dashboard()]));
}

#[tokio::test]
async fn test_failed_withdrawal_keeps_cached_list() {
    // Arrange
    let api = Arc::new(FakeApi::default());
    api.fail_writes.store(true, Ordering::SeqCst);
    let market = market_over(api.clone());
    let withdrawals = market.withdrawals();
    withdrawals.list().await.unwrap();

    // Act
    let result = withdrawals.cancel("w1").await;
    withdrawals.list().await.unwrap();

    // Assert
    assert!(result.is_err());
    assert_eq!(api.calls("withdrawals"), 1);
    assert!(market
        .cache()
        .is_fresh(&keys::withdrawals_page(withdrawals.pager().query())));
}

#[tokio::test]
async fn test_rating_refreshes_ratings_note_and_catalogue() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1", "n2"]));
    let market = market_over(api.clone());
    let ratings = market.ratings();
    let notes = market.notes();
    ratings.for_note("n1").await.unwrap();
    notes.detail("n1").await.unwrap();
    notes.detail("n2").await.unwrap();
    notes.list().await.unwrap();
    market.events().drain();

    // Act
    let rating = ratings
        .rate(CreateRatingRequest {
            note_id: "n1".to_string(),
            rating: 5,
            comment: Some("Clear and complete".to_string()),
        })
        .await
        .unwrap();
    ratings.for_note("n1").await.unwrap();
    notes.detail("n1").await.unwrap();
    notes.detail("n2").await.unwrap();
    notes.list().await.unwrap();

    // Assert
    assert_eq!(rating.rating, 5);
    assert_eq!(api.calls("note_ratings"), 2);
    assert_eq!(api.calls("list_notes"), 2);
    // n1 refetched; n2 untouched
    assert_eq!(api.calls("get_note"), 3);
    assert!(market.events().drain().iter().any(|e| matches!(
        e,
        ClientEvent::Invalidated(keys)
            if keys == &vec![keys::note_ratings("n1"), keys::note("n1"), keys::notes()]
    )));
}

// ========== Garbage Collection ==========

#[tokio::test]
async fn test_gc_task_collects_idle_entries() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let options = CacheOptions {
        gc_time: Duration::from_millis(50),
        ..CacheOptions::default()
    };
    let market = Marketplace::with_api(api.clone(), options, Session::with_token("t"), EventBus::new());
    market.notes().list().await.unwrap();
    market.notes().detail("n1").await.unwrap();
    assert_eq!(market.cache().len(), 2);

    // Act
    let gc = market.cache().spawn_gc(Duration::from_millis(20));
    tokio::time::timeout(Duration::from_secs(5), async {
        while !market.cache().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("gc task never collected");
    gc.abort();

    // Assert
    assert!(market.cache().is_empty());
    market.notes().list().await.unwrap();
    assert_eq!(api.calls("list_notes"), 2);
}

// ========== Pagination and Filters ==========

#[tokio::test]
async fn test_filter_change_resets_page() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api);
    let mut notes = market.notes();
    notes.set_page(3);

    // Act
    notes.set_search(Some("  calculus ".to_string()));

    // Assert
    assert_eq!(notes.pager().page(), 1);
    assert_eq!(notes.filters().search.as_deref(), Some("calculus"));

    // Same filters again keep the page
    notes.set_page(2);
    notes.set_search(Some("calculus".to_string()));
    assert_eq!(notes.pager().page(), 2);
}

#[tokio::test]
async fn test_pages_are_cached_separately() {
    // Arrange
    let api = Arc::new(FakeApi::with_notes(&["n1"]));
    let market = market_over(api.clone());
    let mut notes = market.notes();

    // Act
    notes.list().await.unwrap();
    notes.set_page(2);
    let second = notes.list().await.unwrap();
    notes.set_page(1);
    notes.list().await.unwrap();

    // Assert
    assert_eq!(second.page, 2);
    assert_eq!(api.calls("list_notes"), 2);
}
