//! # Notification Channel
//!
//! Background task that keeps the `/notifications` socket open, answers
//! Engine.IO pings, and turns pushed events into cache invalidations and
//! client events. The connection lifecycle is driven by
//! [`ConnectionMachine`].
//!
//! The task follows the [`Session`]: when the user signs out or the session
//! expires it leaves the namespace and idles until the next sign-in, and a
//! sign-in as someone else rejoins with the new token.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde_json::{json, Value};
use shared::{Notification, NotificationsReadPayload};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::frame::{self, EnginePacket, FrameError, OpenPayload, SocketPacket};
use super::state::{ConnectionEvent, ConnectionMachine, ConnectionState, ReconnectPolicy};
use super::RealtimeStatus;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::events::{ClientEvent, EventBus};
use crate::queries::keys;
use crate::session::Session;

pub const NAMESPACE: &str = "/notifications";

/// Open packet, namespace ack and auth must arrive within this window.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Engine.IO endpoint for a base socket URL such as `wss://api.example.com`.
pub fn socket_url(ws_url: &str) -> String {
    format!(
        "{}/socket.io/?EIO=4&transport=websocket",
        ws_url.trim_end_matches('/')
    )
}

#[derive(Debug, Error)]
enum ChannelError {
    #[error("No session token")]
    Unauthenticated,
    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Bad frame: {0}")]
    Frame(#[from] FrameError),
    #[error("Namespace connect rejected: {0}")]
    Rejected(String),
    #[error("Handshake timed out")]
    Timeout,
    #[error("Connection closed during handshake")]
    Closed,
}

/// Events the backend pushes on the notifications namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Notification(Notification),
    Cleared,
    Read { ids: Vec<String> },
    Other(String),
}

impl ServerEvent {
    pub fn parse(name: &str, args: Vec<Value>) -> Result<Self, FrameError> {
        let first = args.into_iter().next();
        match name {
            "notification" => {
                let payload =
                    first.ok_or_else(|| FrameError::Json("missing notification".to_string()))?;
                Ok(ServerEvent::Notification(serde_json::from_value(payload)?))
            }
            "clear" => Ok(ServerEvent::Cleared),
            "read" => {
                let payload: NotificationsReadPayload = match first {
                    Some(Value::Null) | None => NotificationsReadPayload::default(),
                    Some(value) => serde_json::from_value(value)?,
                };
                Ok(ServerEvent::Read { ids: payload.ids })
            }
            other => Ok(ServerEvent::Other(other.to_string())),
        }
    }
}

/// State shared between the task and the handle.
#[derive(Clone)]
struct ChannelContext {
    url: String,
    session: Session,
    cache: QueryCache,
    events: EventBus,
    status: Arc<RwLock<RealtimeStatus>>,
}

impl ChannelContext {
    fn publish(&self, machine: &ConnectionMachine) {
        let snapshot = {
            let mut status = self.status.write();
            status.state = machine.state().clone();
            status.last_error = machine.last_error().map(str::to_string);
            match machine.state() {
                ConnectionState::Connecting { .. } => status.connection_attempts += 1,
                ConnectionState::Connected { since } => status.last_connected = Some(*since),
                _ => {}
            }
            status.clone()
        };
        self.events.emit(ClientEvent::RealtimeStatus(snapshot));
    }

    fn dispatch(&self, name: &str, args: Vec<Value>) {
        {
            let mut status = self.status.write();
            status.messages_received += 1;
            status.last_message = Some(Utc::now());
        }

        match ServerEvent::parse(name, args) {
            Ok(ServerEvent::Notification(notification)) => {
                info!(
                    notification_id = %notification.id,
                    kind = ?notification.kind,
                    "Notification received"
                );
                self.cache.invalidate(&keys::notifications());
                self.events.emit(ClientEvent::NotificationReceived(notification));
            }
            Ok(ServerEvent::Cleared) => {
                debug!("Notifications cleared remotely");
                self.cache.invalidate(&keys::notifications());
                self.events.emit(ClientEvent::NotificationsCleared);
            }
            Ok(ServerEvent::Read { ids }) => {
                debug!(count = ids.len(), "Notifications marked read remotely");
                self.cache.invalidate(&keys::notifications());
                self.events.emit(ClientEvent::NotificationsRead { ids });
            }
            Ok(ServerEvent::Other(name)) => {
                trace!(event = %name, "Ignoring unknown notification event");
            }
            Err(e) => {
                warn!(event = %name, error = %e, "Malformed notification event");
            }
        }
    }
}

enum SessionEnd {
    Shutdown,
    Lost(String),
    /// The session signed in as someone else or signed out
    SessionChanged,
}

/// Handle to the running notification task.
pub struct NotificationChannel {
    status: Arc<RwLock<RealtimeStatus>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl NotificationChannel {
    /// Connect to `config.ws_url` with the default reconnect policy.
    pub fn spawn(config: &ClientConfig, session: Session, cache: QueryCache, events: EventBus) -> Self {
        Self::spawn_with_policy(
            socket_url(&config.ws_url),
            ReconnectPolicy::default(),
            session,
            cache,
            events,
        )
    }

    /// `url` is the full Engine.IO endpoint, see [`socket_url`].
    pub fn spawn_with_policy(
        url: String,
        policy: ReconnectPolicy,
        session: Session,
        cache: QueryCache,
        events: EventBus,
    ) -> Self {
        let status = Arc::new(RwLock::new(RealtimeStatus::default()));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let ctx = ChannelContext {
            url,
            session,
            cache,
            events,
            status: Arc::clone(&status),
        };
        let task = tokio::spawn(run(ctx, ConnectionMachine::new(policy), shutdown_rx));
        Self {
            status,
            shutdown,
            task,
        }
    }

    pub fn status(&self) -> RealtimeStatus {
        self.status.read().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.status.read().state.clone()
    }

    /// False once the task gave up (max attempts) or was shut down. A
    /// signed-out channel keeps running and waits for the next sign-in.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Close the socket and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Notification task ended abnormally");
        }
        self.status.write().state = ConnectionState::Disconnected;
    }
}

async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

fn session_changed(ctx: &ChannelContext) -> ConnectionEvent {
    let authenticated = ctx.session.is_authenticated();
    info!(authenticated, "Session changed, notification channel follows");
    ConnectionEvent::SessionChanged { authenticated }
}

async fn run(ctx: ChannelContext, mut machine: ConnectionMachine, mut shutdown: watch::Receiver<bool>) {
    info!(url = %ctx.url, "Starting notification channel");
    let mut session = ctx.session.changes();
    // Disconnected because nobody is signed in, as opposed to giving up.
    let mut signed_out = false;
    machine.apply(ConnectionEvent::Start, Utc::now());
    ctx.publish(&machine);

    loop {
        let event = match machine.state().clone() {
            ConnectionState::Disconnected if !signed_out => break,

            ConnectionState::Disconnected => {
                debug!("Notification channel waiting for sign-in");
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => break,
                    changed = session.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        session.mark_unchanged();
                        if !ctx.session.is_authenticated() {
                            continue;
                        }
                        session_changed(&ctx)
                    }
                }
            }

            ConnectionState::Connecting { attempt } => {
                debug!(attempt, "Connecting notification channel");
                session.mark_unchanged();
                let connected = tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => None,
                    result = connect(&ctx) => Some(result),
                };
                match connected {
                    None => ConnectionEvent::Shutdown,
                    Some(Err(ChannelError::Unauthenticated)) => {
                        debug!("No session token, notification channel idle");
                        ConnectionEvent::SessionChanged { authenticated: false }
                    }
                    Some(Err(e)) => {
                        warn!(attempt, error = %e, "Notification channel connect failed");
                        ConnectionEvent::ConnectFailed(e.to_string())
                    }
                    Some(Ok((socket, open))) => {
                        machine.apply(ConnectionEvent::Opened, Utc::now());
                        info!(sid = %open.sid, attempt, "Notification channel connected");
                        if machine.is_reconnect() {
                            // Events pushed while we were away are not replayed.
                            ctx.cache.invalidate(&keys::notifications());
                        }
                        ctx.publish(&machine);

                        match read_loop(&ctx, socket, &open, &mut shutdown, &mut session).await {
                            SessionEnd::Shutdown => ConnectionEvent::Shutdown,
                            SessionEnd::SessionChanged => session_changed(&ctx),
                            SessionEnd::Lost(reason) => {
                                warn!(reason = %reason, "Notification channel lost");
                                ConnectionEvent::Lost(reason)
                            }
                        }
                    }
                }
            }

            ConnectionState::Backoff { attempt, retry_in } => {
                info!(
                    attempt,
                    delay_secs = retry_in.as_secs(),
                    "Reconnecting notification channel in {}s",
                    retry_in.as_secs()
                );
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => ConnectionEvent::Shutdown,
                    _ = tokio::time::sleep(retry_in) => ConnectionEvent::BackoffElapsed,
                    Ok(()) = session.changed() => {
                        session.mark_unchanged();
                        session_changed(&ctx)
                    }
                }
            }

            // Connected is only held inside the read loop above.
            ConnectionState::Connected { .. } => ConnectionEvent::Lost("read loop ended".to_string()),
        };

        signed_out = event == ConnectionEvent::SessionChanged { authenticated: false };
        let transition = machine.apply(event, Utc::now());
        if transition.changed() {
            ctx.publish(&machine);
        }
    }

    info!(
        connections = machine.connections(),
        last_error = ?machine.last_error(),
        "Notification channel stopped"
    );
}

/// Open the socket, complete the Engine.IO handshake and join the namespace
/// with the session token.
async fn connect(ctx: &ChannelContext) -> Result<(Socket, OpenPayload), ChannelError> {
    let token = ctx.session.token().ok_or(ChannelError::Unauthenticated)?;
    tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake(&ctx.url, token))
        .await
        .map_err(|_| ChannelError::Timeout)?
}

async fn handshake(url: &str, token: String) -> Result<(Socket, OpenPayload), ChannelError> {
    let (mut socket, response) = connect_async(url).await?;
    debug!(status = ?response.status(), "WebSocket upgraded");

    let open = loop {
        match next_packet(&mut socket).await? {
            EnginePacket::Open(open) => break open,
            other => trace!(?other, "Ignoring packet before open"),
        }
    };

    let join = EnginePacket::Message(SocketPacket::Connect {
        namespace: NAMESPACE.to_string(),
        data: Some(json!({ "token": token })),
    });
    socket.send(Message::Text(frame::encode(&join))).await?;

    loop {
        match next_packet(&mut socket).await? {
            EnginePacket::Message(SocketPacket::Connect { namespace, .. }) if namespace == NAMESPACE => {
                return Ok((socket, open));
            }
            EnginePacket::Message(SocketPacket::ConnectError { namespace, message })
                if namespace == NAMESPACE =>
            {
                return Err(ChannelError::Rejected(message));
            }
            EnginePacket::Ping(data) => {
                socket
                    .send(Message::Text(frame::encode(&EnginePacket::Pong(data))))
                    .await?;
            }
            EnginePacket::Close => return Err(ChannelError::Closed),
            other => trace!(?other, "Ignoring packet during handshake"),
        }
    }
}

async fn next_packet(socket: &mut Socket) -> Result<EnginePacket, ChannelError> {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return Ok(frame::decode(&text)?),
            Some(Ok(Message::Close(_))) | None => return Err(ChannelError::Closed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

async fn read_loop(
    ctx: &ChannelContext,
    socket: Socket,
    open: &OpenPayload,
    shutdown: &mut watch::Receiver<bool>,
    session: &mut watch::Receiver<u64>,
) -> SessionEnd {
    let (mut write, mut read) = socket.split();
    // The server pings every `ping_interval`; silence past the timeout means
    // the connection is dead even if TCP has not noticed.
    let idle = Duration::from_millis(open.ping_interval + open.ping_timeout);

    let leave = Message::Text(frame::encode(&EnginePacket::Message(SocketPacket::Disconnect {
        namespace: NAMESPACE.to_string(),
    })));

    loop {
        let next = tokio::select! {
            _ = shutdown_requested(shutdown) => {
                let _ = write.send(leave.clone()).await;
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::Shutdown;
            }
            Ok(()) = session.changed() => {
                session.mark_unchanged();
                let _ = write.send(leave.clone()).await;
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::SessionChanged;
            }
            next = tokio::time::timeout(idle, read.next()) => next,
        };

        let message = match next {
            Err(_) => return SessionEnd::Lost("ping timeout".to_string()),
            Ok(None) => return SessionEnd::Lost("connection closed".to_string()),
            Ok(Some(Err(e))) => return SessionEnd::Lost(e.to_string()),
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => match frame::decode(&text) {
                Ok(EnginePacket::Ping(data)) => {
                    trace!("Engine.IO ping");
                    let pong = Message::Text(frame::encode(&EnginePacket::Pong(data)));
                    if let Err(e) = write.send(pong).await {
                        return SessionEnd::Lost(e.to_string());
                    }
                }
                Ok(EnginePacket::Close) => return SessionEnd::Lost("server closed transport".to_string()),
                Ok(EnginePacket::Message(SocketPacket::Event { namespace, name, args, .. }))
                    if namespace == NAMESPACE =>
                {
                    ctx.dispatch(&name, args);
                }
                Ok(EnginePacket::Message(SocketPacket::Disconnect { namespace })) if namespace == NAMESPACE => {
                    return SessionEnd::Lost("namespace disconnected by server".to_string());
                }
                Ok(other) => trace!(?other, "Ignoring packet"),
                Err(e) => warn!(error = %e, "Undecodable frame"),
            },
            Message::Ping(data) => {
                if let Err(e) = write.send(Message::Pong(data)).await {
                    return SessionEnd::Lost(e.to_string());
                }
            }
            Message::Close(close) => {
                let reason = close
                    .map(|f| format!("closed by server ({}): {}", u16::from(f.code), f.reason))
                    .unwrap_or_else(|| "closed by server".to_string());
                return SessionEnd::Lost(reason);
            }
            _ => trace!("Ignoring non-text WebSocket message"),
        }
    }
}
