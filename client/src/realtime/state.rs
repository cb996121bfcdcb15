//! Connection state machine of the notification channel.
//!
//! ```text
//!                Start
//! Disconnected ────────▶ Connecting{n} ──Opened──▶ Connected
//!      ▲                   │      ▲                   │
//!      │ max attempts      │      │ BackoffElapsed    │ Lost
//!      └───────────────────┤      │                   ▼
//!                          └──▶ Backoff{n, retry_in} ◀┘
//!                    ConnectFailed
//!
//! Shutdown from any state ─▶ Disconnected
//! SessionChanged ─▶ Connecting{1} with a token, Disconnected without
//! ```
//!
//! A connection that drops before `min_stable` is counted like a failed
//! attempt, so a server that accepts and immediately closes is retried with
//! growing delays instead of every `initial_delay`.

use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// `attempt` counts attempts since the last successful connection, from 1
    Connecting { attempt: u32 },
    Connected { since: DateTime<Utc> },
    /// Waiting `retry_in` after `attempt` consecutive failures
    Backoff { attempt: u32, retry_in: Duration },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::Connected { .. } => "connected",
            ConnectionState::Backoff { .. } => "backoff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Start,
    Opened,
    ConnectFailed(String),
    Lost(String),
    BackoffElapsed,
    Shutdown,
    /// The session signed in, switched user or signed out
    SessionChanged { authenticated: bool },
}

/// Exponential reconnect delays: `initial_delay`, doubled per consecutive
/// failure, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Give up and stay `Disconnected` after this many consecutive failures.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    /// A connection that lasted at least this long resets the delay.
    pub min_stable: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: None,
            min_stable: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay after `failures` consecutive failures. Zero and one failure both
    /// wait `initial_delay`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let factor = 2u32.saturating_pow(exponent);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    policy: ReconnectPolicy,
    connections: u64,
    /// Consecutive connections that dropped before `min_stable`
    unstable: u32,
    last_error: Option<String>,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
            connections: 0,
            unstable: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Successful connections so far.
    pub fn connections(&self) -> u64 {
        self.connections
    }

    /// True right after a `Connected` transition that was not the first.
    pub fn is_reconnect(&self) -> bool {
        self.state.is_connected() && self.connections > 1
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply `event`, returning the transition. Events that make no sense in
    /// the current state leave it unchanged.
    pub fn apply(&mut self, event: ConnectionEvent, now: DateTime<Utc>) -> Transition {
        use ConnectionEvent as E;
        use ConnectionState as S;

        let from = self.state.clone();
        let next = match (&self.state, event) {
            (_, E::Shutdown) => Some(S::Disconnected),

            (_, E::SessionChanged { authenticated }) => {
                self.unstable = 0;
                self.last_error = None;
                Some(if authenticated {
                    S::Connecting { attempt: 1 }
                } else {
                    S::Disconnected
                })
            }

            (S::Disconnected, E::Start) => Some(S::Connecting { attempt: 1 }),
            (S::Backoff { attempt, .. }, E::Start | E::BackoffElapsed) => {
                Some(S::Connecting { attempt: attempt + 1 })
            }

            (S::Connecting { .. }, E::Opened) => {
                self.connections += 1;
                self.last_error = None;
                Some(S::Connected { since: now })
            }

            (S::Connecting { attempt }, E::ConnectFailed(reason) | E::Lost(reason)) => {
                let failures = *attempt;
                self.last_error = Some(reason);
                if self.policy.exhausted(failures) {
                    tracing::warn!(failures, "Giving up on notification channel");
                    Some(S::Disconnected)
                } else {
                    Some(S::Backoff {
                        attempt: failures,
                        retry_in: self.policy.delay_for(failures),
                    })
                }
            }

            (S::Connected { since }, E::Lost(reason)) => {
                self.last_error = Some(reason);
                let lived = (now - *since).to_std().unwrap_or_default();
                if lived >= self.policy.min_stable {
                    self.unstable = 0;
                } else {
                    self.unstable = self.unstable.saturating_add(1);
                }
                Some(S::Backoff {
                    attempt: 0,
                    retry_in: self.policy.delay_for(self.unstable.saturating_add(1)),
                })
            }

            (state, event) => {
                tracing::debug!(state = state.label(), ?event, "Ignoring connection event");
                None
            }
        };

        if let Some(next) = next {
            self.state = next;
        }
        Transition {
            from,
            to: self.state.clone(),
        }
    }
}
