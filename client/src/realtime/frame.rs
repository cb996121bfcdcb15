//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                    ping / pong
//! 40/notifications,{"token":".."}                          namespace connect
//! 42/notifications,["notification",{..}]                   event
//! 44/notifications,{"message":"Unauthorized"}              connect error
//! 41/notifications,                                        namespace disconnect
//! ```
//!
//! Binary packets are not used by the notification namespace and are
//! rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Empty frame")]
    Empty,
    #[error("Unknown Engine.IO packet type '{0}'")]
    UnknownEnginePacket(char),
    #[error("Unknown Socket.IO packet type '{0}'")]
    UnknownSocketPacket(char),
    #[error("Binary Socket.IO packets are not supported")]
    Binary,
    #[error("Invalid JSON payload: {0}")]
    Json(String),
    #[error("Event payload must be an array starting with the event name")]
    MissingEventName,
    #[error("Acknowledgement without id")]
    MissingAckId,
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        FrameError::Json(err.to_string())
    }
}

/// Handshake data sent by the server in the `0` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenPayload),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

impl SocketPacket {
    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }
}

pub fn decode(text: &str) -> Result<EnginePacket, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(rest)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_string())),
        '3' => Ok(EnginePacket::Pong(rest.to_string())),
        '4' => decode_socket(rest).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(FrameError::UnknownEnginePacket(other)),
    }
}

fn decode_socket(text: &str) -> Result<SocketPacket, FrameError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(FrameError::Empty)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(FrameError::Binary);
    }

    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => {
                let ns = &rest[..idx];
                rest = &rest[idx + 1..];
                ns.to_string()
            }
            None => {
                let ns = rest.to_string();
                rest = "";
                ns
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let id = if digits > 0 {
        rest[..digits].parse::<u64>().ok()
    } else {
        None
    };
    let data = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect {
            namespace,
            data: if data.is_empty() {
                None
            } else {
                Some(serde_json::from_str(data)?)
            },
        }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match serde_json::from_str::<Value>(data)? {
                Value::Array(values) => values,
                _ => return Err(FrameError::MissingEventName),
            };
            if args.is_empty() {
                return Err(FrameError::MissingEventName);
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                _ => return Err(FrameError::MissingEventName),
            };
            Ok(SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            })
        }
        '3' => {
            let id = id.ok_or(FrameError::MissingAckId)?;
            let args = match serde_json::from_str::<Value>(data)? {
                Value::Array(values) => values,
                other => vec![other],
            };
            Ok(SocketPacket::Ack { namespace, id, args })
        }
        '4' => {
            let message = match serde_json::from_str::<Value>(data).unwrap_or(Value::Null) {
                Value::String(message) => message,
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Connection refused")
                    .to_string(),
                _ => "Connection refused".to_string(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        other => Err(FrameError::UnknownSocketPacket(other)),
    }
}

pub fn encode(packet: &EnginePacket) -> String {
    match packet {
        EnginePacket::Open(payload) => {
            format!("0{}", serde_json::to_string(payload).unwrap_or_default())
        }
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(data) => format!("2{data}"),
        EnginePacket::Pong(data) => format!("3{data}"),
        EnginePacket::Message(packet) => format!("4{}", encode_socket(packet)),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    }
}

fn encode_socket(packet: &SocketPacket) -> String {
    let (kind, id, data) = match packet {
        SocketPacket::Connect { data, .. } => (
            '0',
            None,
            data.as_ref().map(Value::to_string).unwrap_or_default(),
        ),
        SocketPacket::Disconnect { .. } => ('1', None, String::new()),
        SocketPacket::Event { id, name, args, .. } => {
            let mut values = Vec::with_capacity(args.len() + 1);
            values.push(Value::String(name.clone()));
            values.extend(args.iter().cloned());
            ('2', *id, Value::Array(values).to_string())
        }
        SocketPacket::Ack { id, args, .. } => ('3', Some(*id), Value::Array(args.clone()).to_string()),
        SocketPacket::ConnectError { message, .. } => (
            '4',
            None,
            serde_json::json!({ "message": message }).to_string(),
        ),
    };

    let mut out = String::new();
    out.push(kind);
    let namespace = packet.namespace();
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        out.push(',');
    }
    if let Some(id) = id {
        out.push_str(&id.to_string());
    }
    out.push_str(&data);
    out
}
