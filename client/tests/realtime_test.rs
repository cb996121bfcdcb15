//! # Notification Channel Tests
//!
//! Drives [`NotificationChannel`] against an in-process Socket.IO endpoint
//! built on axum's WebSocket support.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use notemarket::queries::keys;
use notemarket::realtime::{socket_url, NotificationChannel, ReconnectPolicy};
use notemarket::{CacheOptions, ClientEvent, ConnectionState, EventBus, QueryCache, Session};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use shared::{User, UserRole};

const OPEN: &str =
    r#"0{"sid":"eio-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
const JOINED: &str = r#"40/notifications,{"sid":"sio-1"}"#;
const PUSHED: &str = r#"42/notifications,["notification",{"id":"n1","title":"New sale","message":"Someone bought Analysis I","type":"sale","read":false,"createdAt":"2026-10-01T12:00:00Z"}]"#;

/// How the mock server treats each connection
#[derive(Clone, Copy)]
enum Script {
    /// Accept, push one notification, stay open
    Push,
    /// Reject the namespace join
    Reject,
    /// Accept the first connection then drop it; later ones stay open
    DropFirst,
}

#[derive(Clone)]
struct MockState {
    script: Script,
    connections: Arc<AtomicU32>,
    joins: Arc<Mutex<Vec<String>>>,
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<MockState>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: MockState) {
    let connection = state.connections.fetch_add(1, Ordering::SeqCst) + 1;
    if socket.send(Message::Text(OPEN.into())).await.is_err() {
        return;
    }

    let Some(Ok(Message::Text(join))) = socket.recv().await else {
        return;
    };
    state.joins.lock().push(join.as_str().to_string());

    match state.script {
        Script::Reject => {
            let _ = socket
                .send(Message::Text(r#"44/notifications,{"message":"Unauthorized"}"#.into()))
                .await;
            return;
        }
        Script::Push => {
            let _ = socket.send(Message::Text(JOINED.into())).await;
            let _ = socket.send(Message::Text(PUSHED.into())).await;
        }
        Script::DropFirst => {
            let _ = socket.send(Message::Text(JOINED.into())).await;
            if connection == 1 {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        }
    }

    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
    }
}

async fn serve(script: Script) -> (String, MockState) {
    let state = MockState {
        script,
        connections: Arc::default(),
        joins: Arc::default(),
    };
    let app = Router::new()
        .route("/socket.io/", get(upgrade))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (socket_url(&format!("ws://{addr}")), state)
}

fn fast_policy(max_attempts: Option<u32>) -> ReconnectPolicy {
    ReconnectPolicy {
        initial_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(100),
        max_attempts,
        min_stable: Duration::from_secs(1),
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: format!("{id}@uni.edu"),
        university: None,
        avatar_url: None,
        role: UserRole::Student,
        balance: dec!(0),
        created_at: Utc::now(),
    }
}

/// Poll `cond` every 10 ms for up to five seconds
async fn eventually(what: &str, cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

/// Wait for the first event matching `pred`
async fn wait_for(events: &EventBus, pred: impl Fn(&ClientEvent) -> bool) -> ClientEvent {
    let rx = events.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event did not arrive in time")
}

#[tokio::test]
async fn test_pushed_notification_invalidates_and_emits() {
    // Arrange
    let (url, state) = serve(Script::Push).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());
    cache
        .fetch(keys::unread_count(), || async { Ok(2u64) })
        .await
        .unwrap();
    assert!(cache.is_fresh(&keys::unread_count()));

    // Act
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(None),
        Session::with_token("tok-1"),
        cache.clone(),
        events.clone(),
    );
    let event = wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Assert
    match event {
        ClientEvent::NotificationReceived(notification) => {
            assert_eq!(notification.id, "n1");
            assert_eq!(notification.title, "New sale");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!cache.is_fresh(&keys::unread_count()));
    assert!(channel.state().is_connected());
    assert_eq!(channel.status().messages_received, 1);

    let joins = state.joins.lock().clone();
    assert_eq!(joins.len(), 1);
    assert!(joins[0].starts_with("40/notifications,"));
    assert!(joins[0].contains(r#""token":"tok-1""#));

    channel.shutdown().await;
}

#[tokio::test]
async fn test_rejected_join_gives_up_after_max_attempts() {
    // Arrange
    let (url, state) = serve(Script::Reject).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());

    // Act
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(Some(2)),
        Session::with_token("expired"),
        cache,
        events.clone(),
    );
    tokio::time::timeout(Duration::from_secs(5), async {
        while channel.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("channel kept retrying");

    // Assert
    let status = channel.status();
    assert_eq!(status.state, ConnectionState::Disconnected);
    assert_eq!(status.connection_attempts, 2);
    assert!(status.last_error.unwrap_or_default().contains("Unauthorized"));
    assert_eq!(state.connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_connection_reconnects_and_refreshes() {
    // Arrange
    let (url, state) = serve(Script::DropFirst).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());

    // Act
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(None),
        Session::with_token("tok-1"),
        cache,
        events.clone(),
    );
    wait_for(&events, |e| {
        matches!(e, ClientEvent::Invalidated(keys) if keys.contains(&notemarket::queries::keys::notifications()))
    })
    .await;

    // Assert
    assert_eq!(state.connections.load(Ordering::SeqCst), 2);
    tokio::time::timeout(Duration::from_secs(5), async {
        while !channel.state().is_connected() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("channel did not reconnect");

    channel.shutdown().await;
}

// ========== Session Changes ==========

#[tokio::test]
async fn test_signed_out_channel_waits_for_sign_in() {
    // Arrange
    let (url, state) = serve(Script::Push).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());
    let session = Session::new();
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(Some(1)),
        session.clone(),
        cache,
        events.clone(),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.connections.load(Ordering::SeqCst), 0);
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert!(channel.is_running());

    // Act
    session.sign_in("tok-late".to_string(), user("u1"));
    wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Assert
    let joins = state.joins.lock().clone();
    assert_eq!(joins.len(), 1);
    assert!(joins[0].contains(r#""token":"tok-late""#));

    channel.shutdown().await;
}

#[tokio::test]
async fn test_sign_out_leaves_and_next_user_rejoins() {
    // Arrange
    let (url, state) = serve(Script::Push).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());
    let session = Session::with_token("user-a-token");
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(None),
        session.clone(),
        cache,
        events.clone(),
    );
    wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Act: sign out
    session.clear();

    // Assert: the socket is closed and nothing reconnects without a token
    eventually("channel to disconnect", || channel.state() == ConnectionState::Disconnected).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(state.connections.load(Ordering::SeqCst), 1);
    assert!(channel.is_running());

    // Act: another user signs in
    session.sign_in("user-b-token".to_string(), user("u2"));
    wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Assert
    let joins = state.joins.lock().clone();
    assert_eq!(joins.len(), 2);
    assert!(joins[0].contains(r#""token":"user-a-token""#));
    assert!(joins[1].contains(r#""token":"user-b-token""#));
    assert!(channel.state().is_connected());

    channel.shutdown().await;
}

#[tokio::test]
async fn test_switching_user_rejoins_with_new_token() {
    // Arrange
    let (url, state) = serve(Script::Push).await;
    let events = EventBus::new();
    let cache = QueryCache::with_events(CacheOptions::default(), events.clone());
    let session = Session::with_token("user-a-token");
    let channel = NotificationChannel::spawn_with_policy(
        url,
        fast_policy(None),
        session.clone(),
        cache,
        events.clone(),
    );
    wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Act
    session.sign_in("user-b-token".to_string(), user("u2"));
    wait_for(&events, |e| matches!(e, ClientEvent::NotificationReceived(_))).await;

    // Assert
    assert_eq!(state.connections.load(Ordering::SeqCst), 2);
    let joins = state.joins.lock().clone();
    assert!(joins[1].contains(r#""token":"user-b-token""#));

    channel.shutdown().await;
}
